//==============================================================================
// Array Copy Semantics - Complete Implementation
// Passing a fixed-size array by value versus through a reference
//==============================================================================

use std::fmt;

use colored::Colorize;
use itertools::Itertools;
use log::{debug, info, LevelFilter};
use serde::Deserialize;
use thiserror::Error;

//==============================================================================
// Part 1: Addresses and Rendering
//==============================================================================

/// A raw storage location, printed as `0x...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub usize);

impl Address {
    /// Address of the place `value` refers to. For a reference variable,
    /// pass `&reference` to get the variable's own slot.
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Address(value as *const T as *const () as usize)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Renders a container as `[ada lovelace]`.
pub fn render<T: fmt::Display>(items: &[T]) -> String {
    format!("[{}]", items.iter().join(" "))
}

//==============================================================================
// Part 2: Transcript
//==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub label: String,
    pub value: String,
}

/// Ordered `<label>: <value>` lines produced by a lesson run.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<Line>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: impl Into<String>, value: impl fmt::Display) {
        self.lines.push(Line {
            label: label.into(),
            value: value.to_string(),
        });
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn render_plain(&self) -> String {
        self.lines()
            .iter()
            .map(|line| format!("{}: {}\n", line.label, line.value))
            .collect()
    }

    pub fn render_colored(&self) -> String {
        self.lines()
            .iter()
            .map(|line| format!("{}: {}\n", line.label.as_str().cyan().bold(), line.value))
            .collect()
    }
}

//==============================================================================
// Part 3: Lesson Config and Errors
//==============================================================================

pub const NAME_COUNT: usize = 2;
pub const POINTER_COUNT: usize = 2;

const DEFAULT_NAMES: [&str; NAME_COUNT] = ["ada", "lovelace"];
const DEFAULT_REPLACEMENT: &str = "marie";
const DEFAULT_POINTER_VALUES: [i32; POINTER_COUNT] = [20, 30];

const LESSON_TOML: &str = r#"
names = ["ada", "lovelace"]
replacement = "marie"
replace_index = 0
pointer_values = [20, 30]
"#;

#[derive(Error, Debug)]
pub enum LessonError {
    #[error("Failed to parse lesson config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Field '{field}' must hold exactly {expected} entries, got {actual}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Replace index {index} is out of range for a container of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl LessonError {
    pub fn wrong_length(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::WrongLength {
            field,
            expected,
            actual,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    names: Vec<String>,
    replacement: String,
    replace_index: usize,
    pointer_values: Vec<i32>,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            names: DEFAULT_NAMES.iter().map(|s| s.to_string()).collect(),
            replacement: DEFAULT_REPLACEMENT.to_string(),
            replace_index: 0,
            pointer_values: DEFAULT_POINTER_VALUES.to_vec(),
        }
    }
}

impl RawConfig {
    fn validate(self) -> Result<LessonConfig, LessonError> {
        let names = exactly::<_, NAME_COUNT>("names", self.names)?;
        let pointer_values = exactly::<_, POINTER_COUNT>("pointer_values", self.pointer_values)?;

        if self.replace_index >= NAME_COUNT {
            return Err(LessonError::IndexOutOfRange {
                index: self.replace_index,
                len: NAME_COUNT,
            });
        }

        Ok(LessonConfig {
            names,
            replacement: self.replacement,
            replace_index: self.replace_index,
            pointer_values,
        })
    }
}

fn exactly<T, const N: usize>(field: &'static str, items: Vec<T>) -> Result<[T; N], LessonError> {
    let actual = items.len();
    items
        .try_into()
        .map_err(|_| LessonError::wrong_length(field, N, actual))
}

/// Literal inputs of the lesson. Lengths are fixed by the type, and
/// `replace_index` is known to be in bounds once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonConfig {
    pub names: [String; NAME_COUNT],
    pub replacement: String,
    pub replace_index: usize,
    pub pointer_values: [i32; POINTER_COUNT],
}

impl Default for LessonConfig {
    fn default() -> Self {
        LessonConfig {
            names: DEFAULT_NAMES.map(String::from),
            replacement: DEFAULT_REPLACEMENT.to_string(),
            replace_index: 0,
            pointer_values: DEFAULT_POINTER_VALUES,
        }
    }
}

impl LessonConfig {
    /// Missing keys fall back to the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, LessonError> {
        let raw: RawConfig = toml::from_str(content)?;
        raw.validate()
    }
}

//==============================================================================
// Part 4: Value Pass vs Reference Pass
//==============================================================================

/// What a callee saw: the slot of its parameter and the storage it mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamAddrs {
    pub parameter: Address,
    pub storage: Address,
}

/// Receives the whole array. `[T; N]` is `Copy` when `T` is, so the caller
/// keeps its own array and this function mutates an independent duplicate.
pub fn demonstrate_value_pass<T, const N: usize>(
    mut a: [T; N],
    index: usize,
    replacement: T,
    transcript: &mut Transcript,
) -> ParamAddrs
where
    T: Copy + fmt::Display,
{
    let here = Address::of(&a);
    transcript.record("value", render(&a));
    transcript.record("a address", here);

    a[index] = replacement;
    debug!("value pass: local copy at {} now holds {}", here, render(&a));

    ParamAddrs {
        parameter: here,
        storage: here,
    }
}

/// Receives a reference to the caller's array. The reference is a value of
/// its own with its own slot; writes go to the referent.
pub fn demonstrate_reference_pass<T, const N: usize>(
    a: &mut [T; N],
    index: usize,
    replacement: T,
    transcript: &mut Transcript,
) -> ParamAddrs
where
    T: fmt::Display,
{
    let parameter = Address::of(&a);
    let storage = Address::of(&*a);
    transcript.record("value", format!("&{}", render(&a[..])));
    transcript.record("a address", parameter);

    a[index] = replacement;
    debug!(
        "reference pass: reference at {} wrote through to {}, now {}",
        parameter,
        storage,
        render(&a[..])
    );

    ParamAddrs { parameter, storage }
}

//==============================================================================
// Part 5: Element and Pointer Walks
//==============================================================================

/// Address of every slot, taken in place.
pub fn element_addresses<T, const N: usize>(a: &[T; N]) -> [Address; N] {
    std::array::from_fn(|i| Address::of(&a[i]))
}

/// Walks by reference so each reported address is the element's own slot
/// inside `a`, not a temporary.
pub fn demonstrate_element_walk<T, const N: usize>(
    a: &[T; N],
    transcript: &mut Transcript,
) -> [Address; N]
where
    T: fmt::Display,
{
    transcript.record("a addr", Address::of(a));
    for element in a {
        transcript.record(format!("Value[{}] IndexAddr", element), Address::of(element));
    }
    element_addresses(a)
}

/// Each slot holds a heap pointer; returns where the slots point.
pub fn demonstrate_pointer_array<const N: usize>(
    pointers: &[Box<i32>; N],
    transcript: &mut Transcript,
) -> [Address; N] {
    transcript.record("address of pointers array", Address::of(pointers));
    for ptr in pointers {
        let target: &i32 = ptr;
        transcript.record(format!("Value[{}] IndexAddr", target), Address::of(target));
    }
    std::array::from_fn(|i| Address::of(&*pointers[i]))
}

//==============================================================================
// Part 6: Lesson Runner
//==============================================================================

pub fn run_lesson(config: &LessonConfig) -> Transcript {
    let mut transcript = Transcript::new();
    let index = config.replace_index;
    let replacement = config.replacement.as_str();
    let mut names = config.names.each_ref().map(|name| name.as_str());

    let caller = Address::of(&names);
    transcript.record("names address", caller);

    let copied = demonstrate_value_pass(names, index, replacement, &mut transcript);
    debug!("caller storage {} vs callee copy {}", caller, copied.storage);
    transcript.record(format!("names[{}]", index), names[index]);

    let shared = demonstrate_reference_pass(&mut names, index, replacement, &mut transcript);
    debug!(
        "caller storage {} vs referent {} (reference slot {})",
        caller, shared.storage, shared.parameter
    );
    transcript.record(format!("names[{}]", index), names[index]);

    let zeros = [0i32; 4];
    demonstrate_element_walk(&zeros, &mut transcript);

    let pointers = config.pointer_values.map(Box::new);
    let targets = demonstrate_pointer_array(&pointers, &mut transcript);
    debug!("pointer targets: {}", render(&targets));

    transcript
}

fn main() -> Result<(), LessonError> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = LessonConfig::from_toml_str(LESSON_TOML)?;
    info!("running lesson on {}", render(&config.names));

    let transcript = run_lesson(&config);
    if colored::control::SHOULD_COLORIZE.should_colorize() {
        print!("{}", transcript.render_colored());
    } else {
        print!("{}", transcript.render_plain());
    }
    Ok(())
}

//==============================================================================
// Tests
//==============================================================================
