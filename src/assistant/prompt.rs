//! The system prompt for the waiter assistant.
//!
//! Rendered through [`fmt::Display`]; callers use `to_string()`.

use crate::model::{Language, MenuItem, OrderDraft};
use std::fmt;

pub struct SystemPrompt<'a> {
    pub restaurant_name: &'a str,
    pub table_id: &'a str,
    pub session_id: &'a str,
    pub language: Language,
    /// Full menu; unavailable items are left out when rendering.
    pub menu: &'a [MenuItem],
    pub current_order: Option<&'a OrderDraft>,
}

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::Es => "IMPORTANTE: Siempre responde en espanol de manera amigable y profesional. Usa un tono calido y servicial.",
        Language::En => "IMPORTANT: Always respond in English in a friendly and professional manner. Use a warm and helpful tone.",
    }
}

fn other(language: Language) -> Language {
    match language {
        Language::Es => Language::En,
        Language::En => Language::Es,
    }
}

fn list_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

const RESPONSIBILITIES: &str = "\
## Your Responsibilities:
1. Help customers browse the menu and understand dishes
2. Answer questions about ingredients, allergens, and dietary restrictions
3. Make personalized recommendations based on preferences and availability
4. Manage their order (add, remove, modify items)
5. Send customers to checkout when they are ready (always confirm first)
6. Upsell naturally without being pushy (suggest drinks, sides, desserts)
7. Request human assistance when needed (complex issues, complaints, special requests you can't handle)

## IMPORTANT - Image Display Rules:
- When showing menu items, include the item image using markdown: ![Item Name](imageUrl)
- Only include images when an Image line is listed for the item
- Place each image on its own line, right before the item name and details
- When listing the FULL menu, show images only for the first 2-3 items per category to keep the response concise
- When recommending specific items or when the customer asks about a specific dish, ALWAYS show its image
";

const RULES: &str = "\
## CRITICAL - Function Calling Rules:
- You MUST call the addToOrder function to add items. DO NOT just say you added an item - you must actually call the function.
- When a customer confirms they want to add an item (says \"yes\", \"si\", \"dale\", \"ok\", \"sure\", etc.), IMMEDIATELY call addToOrder with the item's ID.
- Use the exact itemId from the menu list above.
- If you don't call the function, the item will NOT be added to the order.
- Same applies for removeFromOrder and modifyOrderItem - you must call the actual functions.
- When the customer wants to place/submit/pay their order, call proceedToCheckout. This will direct them to the checkout page where they can review their order, add a tip, and complete payment.

## Guidelines:
- Be conversational and friendly, like a helpful human server
- Always confirm orders before adding - but when confirmed, CALL THE FUNCTION
- Mention allergens proactively for items with common allergens
- Suggest pairings naturally
- If an item is unavailable, suggest alternatives
- For complex requests or complaints, use requestHumanAssistance
- Never discuss internal pricing strategies
- Keep responses concise but warm
";

impl fmt::Display for SystemPrompt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lang = self.language;
        writeln!(
            f,
            "You are an AI waitress assistant for {}. {}",
            self.restaurant_name,
            language_instruction(lang)
        )?;
        writeln!(f)?;
        f.write_str(RESPONSIBILITIES)?;

        let available: Vec<&MenuItem> = self.menu.iter().filter(|i| i.is_available()).collect();
        writeln!(f)?;
        writeln!(f, "## Menu Items Available ({} items):", available.len())?;
        for item in available {
            writeln!(f)?;
            writeln!(f, "ITEM: {} / {}", item.name.get(lang), item.name.get(other(lang)))?;
            writeln!(
                f,
                "- itemId: \"{}\" (USE THIS EXACT ID when calling addToOrder)",
                item.id
            )?;
            writeln!(f, "- Price: ${:.2}", item.price)?;
            writeln!(f, "- Description: {}", item.description.get(lang))?;
            writeln!(f, "- Allergens: {}", list_or_none(&item.allergens))?;
            writeln!(f, "- Dietary: {}", list_or_none(&item.dietary_flags))?;
            writeln!(f, "- Prep time: {} min", item.preparation_time)?;
            if let Some(url) = item.image_url.as_deref().filter(|u| !u.is_empty()) {
                writeln!(f, "- Image: {url}")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "## Current Order:")?;
        match self.current_order.filter(|d| !d.is_empty()) {
            Some(draft) => {
                let lines: Vec<String> = draft
                    .items
                    .iter()
                    .map(|line| format!("{}x {}", line.quantity, line.name.get(lang)))
                    .collect();
                writeln!(f, "Items: {}", lines.join(", "))?;
                writeln!(f, "Subtotal: ${:.2}", draft.subtotal)?;
            }
            None => writeln!(f, "Empty - no items yet")?,
        }

        writeln!(f)?;
        f.write_str(RULES)?;
        writeln!(f)?;
        writeln!(f, "Table: {}", self.table_id)?;
        write!(f, "Session: {}", self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu_actor::seed::demo_items;
    use crate::model::{Availability, LineAddition};

    #[test]
    fn test_prompt_lists_available_items_with_exact_ids() {
        let mut menu = demo_items("demo_restaurant");
        menu[0].availability = Availability {
            is_available: false,
            ..Availability::default()
        };
        menu[1].image_url = Some("https://img.example/soup.jpg".to_string());

        let prompt = SystemPrompt {
            restaurant_name: "Casa Demo",
            table_id: "table_3",
            session_id: "s1",
            language: Language::Es,
            menu: &menu,
            current_order: None,
        }
        .to_string();

        assert!(prompt.starts_with("You are an AI waitress assistant for Casa Demo. IMPORTANTE:"));
        assert!(prompt.contains("## Menu Items Available (9 items):"));
        assert!(!prompt.contains("caesar-salad"));
        assert!(prompt.contains("ITEM: Sopa de Tomate / Tomato Soup"));
        assert!(prompt.contains("- itemId: \"tomato-soup\" (USE THIS EXACT ID when calling addToOrder)"));
        assert!(prompt.contains("- Image: https://img.example/soup.jpg"));
        assert!(prompt.contains("- Allergens: None"));
        assert!(prompt.contains("Empty - no items yet"));
        assert!(prompt.ends_with("Table: table_3\nSession: s1"));
    }

    #[test]
    fn test_prompt_shows_current_order() {
        let menu = demo_items("demo_restaurant");
        let mut draft = OrderDraft::default();
        draft.add(
            LineAddition {
                item: &menu[2],
                quantity: 2,
                modifiers: Vec::new(),
                special_instructions: None,
            },
            0.08,
        )
        .unwrap();

        let prompt = SystemPrompt {
            restaurant_name: "Casa Demo",
            table_id: "table_3",
            session_id: "s1",
            language: Language::En,
            menu: &menu,
            current_order: Some(&draft),
        }
        .to_string();

        assert!(prompt.contains("Items: 2x Grilled Salmon\nSubtotal: $49.98"));
    }
}
