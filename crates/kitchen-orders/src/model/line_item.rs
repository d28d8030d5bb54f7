use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One line of an order: a dish name with an optional quantity and kitchen note.
///
/// The text form is the one waiters type and the one stored in records:
/// `"2x Cheeseburger (no onions)"`. Quantity and note are both optional, so `"Coke"` is a
/// valid line as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineItemError {
    #[error("item name is empty")]
    EmptyName,
    #[error("quantity must be at least 1 for {0:?}")]
    ZeroQuantity(String),
    #[error("{0:?} is only a note, the item needs a name")]
    NoteOnly(String),
}

impl LineItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            note: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Checks the rules every stored item satisfies.
    ///
    /// Anything accepted here is also accepted when the record is read back, so an order
    /// that was written can always be reloaded.
    pub fn validate(&self) -> Result<(), LineItemError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(LineItemError::EmptyName);
        }
        if split_note(name).0.is_empty() {
            return Err(LineItemError::NoteOnly(name.to_string()));
        }
        if self.quantity == Some(0) {
            return Err(LineItemError::ZeroQuantity(name.to_string()));
        }
        Ok(())
    }

    /// Portions to prepare; a line without a quantity counts as one.
    pub fn units(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    /// Parses free-form order text into line items.
    ///
    /// Lines and commas separate items; commas inside a `(note)` do not. Blank entries are
    /// skipped, so the result may be empty.
    pub fn parse_list(text: &str) -> Result<Vec<LineItem>, LineItemError> {
        split_entries(text)
            .into_iter()
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| entry.parse::<LineItem>())
            .collect()
    }
}

fn split_entries(text: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&text[start..i]);
                start = i + 1;
            }
            '\n' => {
                entries.push(&text[start..i]);
                start = i + 1;
                depth = 0;
            }
            _ => {}
        }
    }
    entries.push(&text[start..]);
    entries
}

/// Splits a leading `"<n>x "` quantity off `text`.
fn split_quantity(text: &str) -> (Option<u32>, &str) {
    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if digits == 0 {
        return (None, text);
    }
    let Some(rest) = text[digits..]
        .trim_start()
        .strip_prefix(|c: char| c == 'x' || c == 'X')
    else {
        return (None, text);
    };
    // "3xl shirt" is a name, not a quantity
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return (None, text);
    }
    match text[..digits].parse() {
        Ok(quantity) => (Some(quantity), rest.trim_start()),
        Err(_) => (None, text),
    }
}

/// Splits a trailing `"(note)"` off `text`. The note is the outermost bracket pair, so it
/// may contain brackets of its own; unbalanced text has no note.
fn split_note(text: &str) -> (&str, Option<&str>) {
    if !text.ends_with(')') {
        return (text, None);
    }
    let mut depth = 0usize;
    for (open, c) in text.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    let note = text[open + 1..text.len() - 1].trim();
                    let rest = text[..open].trim_end();
                    return (rest, (!note.is_empty()).then_some(note));
                }
            }
            _ => {}
        }
    }
    (text, None)
}

impl FromStr for LineItem {
    type Err = LineItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (quantity, rest) = split_quantity(s.trim());
        let (name, note) = split_note(rest);
        let name = name.trim();
        if name.is_empty() {
            return Err(LineItemError::EmptyName);
        }
        if quantity == Some(0) {
            return Err(LineItemError::ZeroQuantity(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            quantity,
            note: note.map(str::to_string),
        })
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(quantity) = self.quantity {
            write!(f, "{}x ", quantity)?;
        }
        f.write_str(&self.name)?;
        if let Some(note) = &self.note {
            write!(f, " ({})", note)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        assert_eq!("Coke".parse::<LineItem>().unwrap(), LineItem::new("Coke"));
        assert_eq!("  Caesar Salad ".parse::<LineItem>().unwrap().name, "Caesar Salad");
    }

    #[test]
    fn test_parse_quantity_and_note() {
        let item: LineItem = "2x Cheeseburger (no onions, extra pickles)".parse().unwrap();
        assert_eq!(item.quantity, Some(2));
        assert_eq!(item.name, "Cheeseburger");
        assert_eq!(item.note.as_deref(), Some("no onions, extra pickles"));
        assert_eq!(item.units(), 2);

        let spaced: LineItem = "3 X Fries".parse().unwrap();
        assert_eq!(spaced.quantity, Some(3));
        assert_eq!(spaced.name, "Fries");
    }

    #[test]
    fn test_names_that_look_like_quantities() {
        assert_eq!("7up".parse::<LineItem>().unwrap().quantity, None);
        assert_eq!("3xl Pizza".parse::<LineItem>().unwrap().name, "3xl Pizza");
        assert_eq!("2 Burgers".parse::<LineItem>().unwrap().name, "2 Burgers");
    }

    #[test]
    fn test_rejects_empty_and_zero() {
        assert_eq!("".parse::<LineItem>(), Err(LineItemError::EmptyName));
        assert_eq!("2x ".parse::<LineItem>(), Err(LineItemError::EmptyName));
        assert_eq!("(just a note)".parse::<LineItem>(), Err(LineItemError::EmptyName));
        assert_eq!(
            "0x Soup".parse::<LineItem>(),
            Err(LineItemError::ZeroQuantity("Soup".into()))
        );
    }

    #[test]
    fn test_note_is_the_outermost_bracket_pair() {
        let item: LineItem = "2x Wings (extra (hot))".parse().unwrap();
        assert_eq!(item.name, "Wings");
        assert_eq!(item.note.as_deref(), Some("extra (hot)"));

        let unbalanced: LineItem = "Wings extra (hot))".parse().unwrap();
        assert_eq!(unbalanced.name, "Wings extra (hot))");
        assert_eq!(unbalanced.note, None);
    }

    #[test]
    fn test_validate_matches_what_records_accept() {
        assert_eq!(LineItem::new("Soup").with_quantity(3).validate(), Ok(()));
        assert_eq!(LineItem::new("  ").validate(), Err(LineItemError::EmptyName));
        assert_eq!(
            LineItem::new("Soup").with_quantity(0).validate(),
            Err(LineItemError::ZeroQuantity("Soup".into()))
        );
        assert_eq!(
            LineItem::new("(chef special)").validate(),
            Err(LineItemError::NoteOnly("(chef special)".into()))
        );
        assert_eq!(LineItem::new("Soup (of the day)").validate(), Ok(()));
    }

    #[test]
    fn test_display_is_the_text_form() {
        let item = LineItem::new("Steak").with_quantity(1).with_note("medium rare");
        assert_eq!(item.to_string(), "1x Steak (medium rare)");
        assert_eq!(item.to_string().parse::<LineItem>().unwrap(), item);
        assert_eq!(LineItem::new("Water").to_string(), "Water");
    }

    #[test]
    fn test_parse_list_splits_lines_and_commas() {
        let items =
            LineItem::parse_list("2x Cheeseburger\n1x Caesar Salad (dressing, on the side)\n\n3x Coke, Fries")
                .unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Cheeseburger", "Caesar Salad", "Coke", "Fries"]);
        assert_eq!(items[1].note.as_deref(), Some("dressing, on the side"));
        assert!(LineItem::parse_list(" \n , ").unwrap().is_empty());
    }
}
