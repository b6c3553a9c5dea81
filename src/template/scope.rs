//! Name resolution against the bound data

use serde_json::Value;

#[derive(Clone, Copy, Debug)]
struct Frame<'a> {
    value: &'a Value,
    /// Position in the enclosing list; `None` for the root record
    index: Option<usize>,
}

/// Stack of data values a placeholder is resolved against: the root record,
/// then one frame per enclosing list element.
#[derive(Clone, Debug)]
pub struct Scope<'a> {
    frames: Vec<Frame<'a>>,
}

/// Outcome of looking a name up
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a Value),
    /// Loop counters are computed, not borrowed from the data
    Counter(usize),
    Missing,
}

impl<'a> Scope<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self {
            frames: vec![Frame {
                value: root,
                index: None,
            }],
        }
    }

    /// Scope for one element of a list being expanded
    pub fn child(&self, value: &'a Value, index: usize) -> Self {
        let mut frames = self.frames.clone();
        frames.push(Frame {
            value,
            index: Some(index),
        });
        Self { frames }
    }

    /// Resolve `.`, `$index`, `$number` or a dot path.
    ///
    /// The first path segment is matched exactly against each frame from the
    /// innermost out; the remaining segments descend from the value found.
    pub fn lookup(&self, name: &str) -> Lookup<'a> {
        let innermost = self.frames[self.frames.len() - 1];
        match name {
            "." => return Lookup::Found(innermost.value),
            "$index" | "$number" => {
                return match self.frames.iter().rev().find_map(|f| f.index) {
                    Some(index) if name == "$index" => Lookup::Counter(index),
                    Some(index) => Lookup::Counter(index + 1),
                    None => Lookup::Missing,
                }
            }
            _ => {}
        }

        let mut segments = name.split('.');
        let Some(head) = segments.next() else {
            return Lookup::Missing;
        };
        let Some(mut value) = self.frames.iter().rev().find_map(|f| field(f.value, head)) else {
            return Lookup::Missing;
        };
        for segment in segments {
            match field(value, segment) {
                Some(next) => value = next,
                None => return Lookup::Missing,
            }
        }
        Lookup::Found(value)
    }
}

fn field<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(name),
        Value::Array(items) => items.get(name.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Text form of a scalar: strings as-is, numbers and booleans in display
/// form, null as empty. Objects and arrays have no text form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Object(_) | Value::Array(_) => None,
    }
}
