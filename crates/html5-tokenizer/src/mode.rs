//! Parse-mode: the tokenizer's top-level content dispatch (spec §3, GLOSSARY).

/// Top-level content dispatch mode. RCData/Rawtext are set externally by
/// the tree-construction stage (spec §3's invariant: "the core exposes
/// parse-mode as writable"); PCData/Script/Plaintext are entered internally
/// in response to specific start tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ParseMode {
    #[default]
    PCData,
    RCData,
    Rawtext,
    Plaintext,
    Script,
}
