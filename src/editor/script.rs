//! Line-based input scripts for driving an [`Editor`](super::Editor).
//!
//! One command per line, blank lines and `#` comments ignored:
//!
//! ```text
//! style bold
//! type hi\n
//! style bold stop
//! select 0 2
//! style italic
//! tap 0
//! ```

use std::str::FromStr;

use clap::ValueEnum;

use super::EditorError;
use crate::annotation::AnnotationKind;

/// A single input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Type text at the caret, one keystroke per char.
    Type(String),
    /// Delete `len` chars at `pos`.
    Delete { pos: usize, len: usize },
    Select { start: usize, end: usize },
    Style { kind: AnnotationKind, stop: bool },
    /// Pointer activation at a char offset.
    Tap(usize),
    /// Replace everything with rendered markdown.
    Load(String),
}

impl Input {
    /// Parse a whole script. Comments and blank lines yield nothing.
    ///
    /// # Errors
    /// Returns [`EditorError::Script`] naming the first bad line.
    pub fn parse_script(script: &str) -> Result<Vec<Self>, EditorError> {
        script
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|(index, line)| {
                line.parse::<Self>().map_err(|message| EditorError::Script {
                    line: index + 1,
                    message,
                })
            })
            .collect()
    }
}

impl FromStr for Input {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();
        match command {
            "type" => Ok(Self::Type(unescape(rest))),
            "newline" => Ok(Self::Type("\n".to_string())),
            "delete" => match args.as_slice() {
                [pos, len] => Ok(Self::Delete {
                    pos: number(pos)?,
                    len: number(len)?,
                }),
                _ => Err("usage: delete <pos> <len>".to_string()),
            },
            "select" => match args.as_slice() {
                [start, end] => Ok(Self::Select {
                    start: number(start)?,
                    end: number(end)?,
                }),
                _ => Err("usage: select <start> <end>".to_string()),
            },
            "caret" => match args.as_slice() {
                [pos] => {
                    let pos = number(pos)?;
                    Ok(Self::Select {
                        start: pos,
                        end: pos,
                    })
                }
                _ => Err("usage: caret <pos>".to_string()),
            },
            "style" => match args.as_slice() {
                [kind] => Ok(Self::Style {
                    kind: style_kind(kind)?,
                    stop: false,
                }),
                [kind, "stop"] => Ok(Self::Style {
                    kind: style_kind(kind)?,
                    stop: true,
                }),
                _ => Err("usage: style <kind> [stop]".to_string()),
            },
            "tap" => match args.as_slice() {
                [pos] => Ok(Self::Tap(number(pos)?)),
                _ => Err("usage: tap <pos>".to_string()),
            },
            "load" => Ok(Self::Load(unescape(rest))),
            other => Err(format!("unknown command {other:?}")),
        }
    }
}

fn number(arg: &str) -> Result<usize, String> {
    arg.parse()
        .map_err(|_| format!("expected a number, got {arg:?}"))
}

fn style_kind(arg: &str) -> Result<AnnotationKind, String> {
    <AnnotationKind as ValueEnum>::from_str(arg, true)
}

/// Expand `\n`, `\t` and `\\`; anything else after a backslash is kept as is.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_command() {
        let script = "\
# shopping
style task-item
type milk\\neggs
newline
delete 0 1
select 1 3
caret 4
style bold stop
tap 0
load * a\\n* b
";
        let inputs = Input::parse_script(script).unwrap();
        assert_eq!(
            inputs,
            vec![
                Input::Style {
                    kind: AnnotationKind::TaskItem,
                    stop: false
                },
                Input::Type("milk\neggs".to_string()),
                Input::Type("\n".to_string()),
                Input::Delete { pos: 0, len: 1 },
                Input::Select { start: 1, end: 3 },
                Input::Select { start: 4, end: 4 },
                Input::Style {
                    kind: AnnotationKind::Bold,
                    stop: true
                },
                Input::Tap(0),
                Input::Load("* a\n* b".to_string()),
            ]
        );
    }

    #[test]
    fn test_type_keeps_inner_spaces() {
        assert_eq!(
            "type a  b".parse::<Input>().unwrap(),
            Input::Type("a  b".to_string())
        );
    }

    #[test]
    fn test_errors_name_the_line() {
        let err = Input::parse_script("type ok\n\nfrobnicate").unwrap_err();
        match err {
            EditorError::Script { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("frobnicate"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        assert!("delete 1".parse::<Input>().is_err());
        assert!("select a b".parse::<Input>().is_err());
        assert!("style underline".parse::<Input>().is_err());
        assert!("tap".parse::<Input>().is_err());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb\tc\\d\q"), "a\nb\tc\\d\\q");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
