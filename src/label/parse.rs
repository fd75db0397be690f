//! Textual label parser.
//!
//! Grammar (whitespace between tokens is ignored):
//!
//! ```text
//! Label := "{" [Env ("," Env)*] "}"
//! Env   := "{" [Id ("," Id)*] "}"
//! Id    := bare | '"' (char | '\\"' | '\\\\')* '"'
//! ```
//!
//! A bare identifier is a run of characters other than whitespace, braces,
//! commas, quotes and backslashes. Any other identifier is quoted, which is
//! how [`Label`]'s `Display` writes it, so the printed form of every label
//! parses back to an equal label.

use std::str::FromStr;

use crate::error::{LabelError, LabelResult};
use crate::identifier::Identifier;
use crate::label::{Environment, Label};

/// Parse the textual form of a label, e.g. `{ {A,B}, {C} }`.
pub fn parse(text: &str) -> LabelResult<Label> {
    let mut label = Label::no_environment();
    let mut current = Environment::empty();
    // Identifier being read, if any.
    let mut item: Option<String> = None;
    // The identifier is complete; only `,` or `}` may follow.
    let mut item_done = false;
    let mut quote_start: Option<usize> = None;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut open = 0usize;
    let mut close = 0usize;
    let mut closed = false;
    // Previous significant character, used to reject `{A,}` and `{ {A},, {B} }`.
    let mut previous: Option<char> = None;

    for (offset, c) in text.char_indices() {
        if quote_start.is_some() {
            let buffer = item.get_or_insert_with(String::new);
            if escaped {
                buffer.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                quote_start = None;
                item_done = true;
                previous = Some(c);
            } else {
                buffer.push(c);
            }
            continue;
        }
        if c.is_whitespace() {
            item_done |= item.is_some();
            continue;
        }
        match c {
            '"' => {
                if depth != 2 || item.is_some() {
                    return Err(LabelError::UnexpectedToken { offset, found: c });
                }
                item = Some(String::new());
                quote_start = Some(offset);
            }
            '{' => {
                open += 1;
                match depth {
                    0 if closed => return Err(LabelError::UnexpectedToken { offset, found: c }),
                    0 => {}
                    1 if previous == Some('}') => {
                        return Err(LabelError::UnexpectedToken { offset, found: c });
                    }
                    1 => current = Environment::empty(),
                    _ => return Err(LabelError::TooDeep { offset }),
                }
                depth += 1;
            }
            '}' => {
                close += 1;
                match depth {
                    0 => return Err(LabelError::Unbalanced { open, close }),
                    1 if previous == Some(',') => return Err(LabelError::EmptyItem { offset }),
                    1 => closed = true,
                    _ => {
                        match item.take() {
                            Some(text) => {
                                current.insert(Identifier::new(text));
                            }
                            None if previous == Some(',') => {
                                return Err(LabelError::EmptyItem { offset });
                            }
                            None => {}
                        }
                        item_done = false;
                        label.insert(std::mem::take(&mut current));
                    }
                }
                depth -= 1;
            }
            ',' => match depth {
                2 => {
                    let Some(text) = item.take() else {
                        return Err(LabelError::EmptyItem { offset });
                    };
                    current.insert(Identifier::new(text));
                    item_done = false;
                }
                1 => {
                    if previous != Some('}') {
                        return Err(LabelError::EmptyItem { offset });
                    }
                }
                _ => return Err(LabelError::UnexpectedToken { offset, found: c }),
            },
            _ => {
                if depth != 2 || item_done || c == '\\' {
                    return Err(LabelError::UnexpectedToken { offset, found: c });
                }
                item.get_or_insert_with(String::new).push(c);
            }
        }
        previous = Some(c);
    }

    if let Some(offset) = quote_start {
        return Err(LabelError::UnterminatedQuote { offset });
    }
    if depth != 0 || !closed {
        return Err(LabelError::Unbalanced { open, close });
    }
    Ok(label)
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(ids: &[&str]) -> Environment {
        ids.iter().map(|s| Identifier::new(*s)).collect()
    }

    #[test]
    fn parse_conjunction() {
        let l = parse("{{ A, B }}").unwrap();
        assert_eq!(l.len(), 1);
        assert!(l.contains(&env(&["A", "B"])));
    }

    #[test]
    fn parse_disjunction() {
        let l = parse("{{ A }, { B }}").unwrap();
        assert_eq!(l.len(), 2);
        assert!(l.contains(&env(&["A"])));
        assert!(l.contains(&env(&["B"])));
    }

    #[test]
    fn parse_mix_ignores_order() {
        let a = parse("{{ A }, { B, C }}").unwrap();
        let b = parse("{{ C,B }, {A}}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_constants() {
        assert_eq!(parse("{}").unwrap(), Label::no_environment());
        assert_eq!(parse("{ {} }").unwrap(), Label::empty_environment());
    }

    #[test]
    fn multi_character_identifiers() {
        let l = parse("{ {rain,wet_grass}, {sprinkler} }").unwrap();
        assert!(l.contains(&env(&["rain", "wet_grass"])));
        assert!(l.contains(&env(&["sprinkler"])));
    }

    #[test]
    fn too_deep_is_rejected() {
        assert!(matches!(
            parse("{ { {A} } }"),
            Err(LabelError::TooDeep { .. })
        ));
    }

    #[test]
    fn unbalanced_is_rejected() {
        assert!(matches!(
            parse("{ {A}"),
            Err(LabelError::Unbalanced { open: 2, close: 1 })
        ));
        assert!(matches!(parse("{A}}"), Err(LabelError::UnexpectedToken { .. })));
        assert!(matches!(parse("{}}"), Err(LabelError::Unbalanced { .. })));
        assert!(matches!(parse(""), Err(LabelError::Unbalanced { .. })));
    }

    #[test]
    fn empty_items_are_rejected() {
        assert!(matches!(parse("{ {A,,B} }"), Err(LabelError::EmptyItem { .. })));
        assert!(matches!(parse("{ {A,} }"), Err(LabelError::EmptyItem { .. })));
        assert!(matches!(parse("{ {A},,{B} }"), Err(LabelError::EmptyItem { .. })));
        assert!(matches!(parse("{ {A}, }"), Err(LabelError::EmptyItem { .. })));
    }

    #[test]
    fn missing_separator_is_rejected() {
        assert!(matches!(parse("{ {A} {B} }"), Err(LabelError::UnexpectedToken { .. })));
    }

    #[test]
    fn trailing_label_is_rejected() {
        assert!(matches!(parse("{} {}"), Err(LabelError::UnexpectedToken { .. })));
    }

    #[test]
    fn printed_form_parses_back() {
        for text in ["{}", "{ {} }", "{ {A} }", "{ {A,B}, {C}, {D,E,F} }"] {
            let l = parse(text).unwrap();
            assert_eq!(parse(&l.to_string()).unwrap(), l);
        }
    }

    #[test]
    fn quoted_identifiers_keep_delimiters() {
        let l = parse(r#"{ {"wet grass", "a,b"}, {""}, {"say \"hi\"", "back\\slash"} }"#).unwrap();
        assert!(l.contains(&env(&["wet grass", "a,b"])));
        assert!(l.contains(&env(&[""])));
        assert!(l.contains(&env(&["say \"hi\"", "back\\slash"])));
        assert_eq!(parse(&l.to_string()).unwrap(), l);
    }

    #[test]
    fn bare_identifiers_cannot_hold_whitespace() {
        assert!(matches!(
            parse("{ {wet grass} }"),
            Err(LabelError::UnexpectedToken { found: 'g', .. })
        ));
        assert!(matches!(
            parse(r#"{ {"wet grass} }"#),
            Err(LabelError::UnterminatedQuote { offset: 3 })
        ));
    }

    #[test]
    fn from_str_delegates() {
        let l: Label = "{ {A} }".parse().unwrap();
        assert_eq!(l, Label::singleton(Identifier::new("A")));
    }
}
