//! Demo menu used to bootstrap restaurants that have no items yet.

use super::MenuItemKey;
use crate::model::{category, LocalizedText, MenuItemCreate};

struct DemoItem {
    id: &'static str,
    category: &'static str,
    name: (&'static str, &'static str),
    description: (&'static str, &'static str),
    price: f64,
    allergens: &'static [&'static str],
    dietary: &'static [&'static str],
    prep_minutes: u32,
    ingredients: &'static [&'static str],
    sort_order: u32,
}

const DEMO_ITEMS: &[DemoItem] = &[
    DemoItem {
        id: "caesar-salad",
        category: category::STARTERS,
        name: ("Caesar Salad", "Ensalada Cesar"),
        description: (
            "Fresh romaine lettuce with parmesan and croutons",
            "Lechuga romana fresca con parmesano y crutones",
        ),
        price: 12.99,
        allergens: &["gluten", "dairy"],
        dietary: &["vegetarian"],
        prep_minutes: 10,
        ingredients: &["romaine lettuce", "parmesan", "croutons", "caesar dressing"],
        sort_order: 1,
    },
    DemoItem {
        id: "tomato-soup",
        category: category::STARTERS,
        name: ("Tomato Soup", "Sopa de Tomate"),
        description: (
            "Homemade tomato soup with fresh basil",
            "Sopa de tomate casera con albahaca fresca",
        ),
        price: 8.99,
        allergens: &[],
        dietary: &["vegetarian", "vegan", "gluten-free"],
        prep_minutes: 5,
        ingredients: &["tomatoes", "basil", "garlic", "olive oil"],
        sort_order: 2,
    },
    DemoItem {
        id: "grilled-salmon",
        category: category::MAINS,
        name: ("Grilled Salmon", "Salmon a la Parrilla"),
        description: (
            "Atlantic salmon with lemon butter sauce and vegetables",
            "Salmon del Atlantico con salsa de limon y vegetales",
        ),
        price: 24.99,
        allergens: &["fish"],
        dietary: &["gluten-free"],
        prep_minutes: 20,
        ingredients: &["salmon", "lemon", "butter", "seasonal vegetables"],
        sort_order: 1,
    },
    DemoItem {
        id: "pasta-primavera",
        category: category::MAINS,
        name: ("Pasta Primavera", "Pasta Primavera"),
        description: (
            "Fresh pasta with seasonal vegetables in garlic sauce",
            "Pasta fresca con vegetales de temporada en salsa de ajo",
        ),
        price: 18.99,
        allergens: &["gluten", "dairy"],
        dietary: &["vegetarian"],
        prep_minutes: 15,
        ingredients: &["pasta", "zucchini", "bell peppers", "garlic"],
        sort_order: 2,
    },
    DemoItem {
        id: "ribeye-steak",
        category: category::MAINS,
        name: ("Ribeye Steak", "Bistec Ribeye"),
        description: (
            "12oz prime ribeye with garlic mashed potatoes",
            "Ribeye premium de 12oz con pure de papas al ajo",
        ),
        price: 34.99,
        allergens: &["dairy"],
        dietary: &["gluten-free"],
        prep_minutes: 25,
        ingredients: &["ribeye", "potatoes", "garlic", "butter"],
        sort_order: 3,
    },
    DemoItem {
        id: "chocolate-cake",
        category: category::DESSERTS,
        name: ("Chocolate Cake", "Pastel de Chocolate"),
        description: (
            "Rich chocolate cake with vanilla ice cream",
            "Pastel de chocolate con helado de vainilla",
        ),
        price: 9.99,
        allergens: &["gluten", "dairy", "eggs"],
        dietary: &["vegetarian"],
        prep_minutes: 5,
        ingredients: &["chocolate", "flour", "eggs", "vanilla ice cream"],
        sort_order: 1,
    },
    DemoItem {
        id: "tiramisu",
        category: category::DESSERTS,
        name: ("Tiramisu", "Tiramisu"),
        description: (
            "Classic Italian dessert with espresso and mascarpone",
            "Postre italiano clasico con espresso y mascarpone",
        ),
        price: 10.99,
        allergens: &["gluten", "dairy", "eggs"],
        dietary: &["vegetarian"],
        prep_minutes: 5,
        ingredients: &["ladyfingers", "espresso", "mascarpone", "cocoa"],
        sort_order: 2,
    },
    DemoItem {
        id: "fresh-lemonade",
        category: category::DRINKS,
        name: ("Fresh Lemonade", "Limonada Fresca"),
        description: (
            "Freshly squeezed lemonade with mint",
            "Limonada recien exprimida con menta",
        ),
        price: 4.99,
        allergens: &[],
        dietary: &["vegan", "gluten-free"],
        prep_minutes: 3,
        ingredients: &["lemons", "mint", "sugar"],
        sort_order: 1,
    },
    DemoItem {
        id: "iced-tea",
        category: category::DRINKS,
        name: ("Iced Tea", "Te Helado"),
        description: ("House-brewed black tea over ice", "Te negro casero con hielo"),
        price: 3.99,
        allergens: &[],
        dietary: &["vegan", "gluten-free"],
        prep_minutes: 2,
        ingredients: &["black tea", "ice"],
        sort_order: 2,
    },
    DemoItem {
        id: "cappuccino",
        category: category::DRINKS,
        name: ("Cappuccino", "Capuchino"),
        description: ("Espresso with steamed milk foam", "Espresso con espuma de leche"),
        price: 5.99,
        allergens: &["dairy"],
        dietary: &["vegetarian", "gluten-free"],
        prep_minutes: 5,
        ingredients: &["espresso", "milk"],
        sort_order: 3,
    },
];

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The demo menu filed under `restaurant_id`.
pub fn demo_menu(restaurant_id: &str) -> Vec<(MenuItemKey, MenuItemCreate)> {
    DEMO_ITEMS
        .iter()
        .map(|item| {
            let key = MenuItemKey::new(restaurant_id, item.id);
            let create = MenuItemCreate {
                restaurant_id: restaurant_id.to_string(),
                category_id: item.category.to_string(),
                name: LocalizedText::new(item.name.0, item.name.1),
                description: LocalizedText::new(item.description.0, item.description.1),
                price: item.price,
                allergens: owned(item.allergens),
                dietary_flags: owned(item.dietary),
                preparation_time: item.prep_minutes,
                ingredients: owned(item.ingredients),
                sort_order: item.sort_order,
            };
            (key, create)
        })
        .collect()
}

/// The demo menu as stored items, without going through an actor.
#[cfg(test)]
pub fn demo_items(restaurant_id: &str) -> Vec<crate::model::MenuItem> {
    use actor_framework::ActorEntity;

    demo_menu(restaurant_id)
        .into_iter()
        .map(|(key, params)| {
            crate::model::MenuItem::from_create_params(key, params).expect("demo item is valid")
        })
        .collect()
}
