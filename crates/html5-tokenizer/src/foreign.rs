//! Foreign-content wrapper (spec §4.4, component 7).
//!
//! Runs *after* token emission so the raw tokenizer stays
//! specification-faithful (spec §9's explicit ordering note); tree
//! construction's own integration-point handling stays out of this layer.
//!
//! Grounded on the teacher's `AtomTable::intern_ascii_folded` pattern for
//! name rewriting, adapted here to two `lazy_static` lookup tables instead
//! of an interning table, since this crate has no atom table to intern into.

use crate::error::FatalParseError;
use crate::token::{Attribute, Token, TokenKind};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// SVG foreign attributes with a camelCase spelling (spec §4.4's
    /// "fixed table... e.g. `viewbox` -> `viewBox`"); a representative
    /// subset of the full SVG attribute-adjustment table.
    static ref SVG_ATTRIBUTE_ADJUSTMENTS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("attributename", "attributeName");
        m.insert("attributetype", "attributeType");
        m.insert("basefrequency", "baseFrequency");
        m.insert("baseprofile", "baseProfile");
        m.insert("calcmode", "calcMode");
        m.insert("clippathunits", "clipPathUnits");
        m.insert("diffuseconstant", "diffuseConstant");
        m.insert("edgemode", "edgeMode");
        m.insert("filterunits", "filterUnits");
        m.insert("gradienttransform", "gradientTransform");
        m.insert("gradientunits", "gradientUnits");
        m.insert("kernelmatrix", "kernelMatrix");
        m.insert("kernelunitlength", "kernelUnitLength");
        m.insert("keypoints", "keyPoints");
        m.insert("keysplines", "keySplines");
        m.insert("keytimes", "keyTimes");
        m.insert("lengthadjust", "lengthAdjust");
        m.insert("markerheight", "markerHeight");
        m.insert("markerwidth", "markerWidth");
        m.insert("numoctaves", "numOctaves");
        m.insert("pathlength", "pathLength");
        m.insert("patterncontentunits", "patternContentUnits");
        m.insert("patterntransform", "patternTransform");
        m.insert("patternunits", "patternUnits");
        m.insert("preserveaspectratio", "preserveAspectRatio");
        m.insert("refx", "refX");
        m.insert("refy", "refY");
        m.insert("repeatcount", "repeatCount");
        m.insert("repeatdur", "repeatDur");
        m.insert("specularconstant", "specularConstant");
        m.insert("specularexponent", "specularExponent");
        m.insert("spreadmethod", "spreadMethod");
        m.insert("startoffset", "startOffset");
        m.insert("stddeviation", "stdDeviation");
        m.insert("surfacescale", "surfaceScale");
        m.insert("systemlanguage", "systemLanguage");
        m.insert("tablevalues", "tableValues");
        m.insert("targetx", "targetX");
        m.insert("targety", "targetY");
        m.insert("textlength", "textLength");
        m.insert("viewbox", "viewBox");
        m.insert("viewtarget", "viewTarget");
        m.insert("xchannelselector", "xChannelSelector");
        m.insert("ychannelselector", "yChannelSelector");
        m.insert("zoomandpan", "zoomAndPan");
        m
    };

    /// SVG element (tag) names with a camelCase spelling.
    static ref SVG_TAG_NAME_ADJUSTMENTS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("altglyph", "altGlyph");
        m.insert("altglyphdef", "altGlyphDef");
        m.insert("altglyphitem", "altGlyphItem");
        m.insert("animatecolor", "animateColor");
        m.insert("animatemotion", "animateMotion");
        m.insert("animatetransform", "animateTransform");
        m.insert("clippath", "clipPath");
        m.insert("feblend", "feBlend");
        m.insert("fecolormatrix", "feColorMatrix");
        m.insert("fecomponenttransfer", "feComponentTransfer");
        m.insert("fecomposite", "feComposite");
        m.insert("feconvolvematrix", "feConvolveMatrix");
        m.insert("fediffuselighting", "feDiffuseLighting");
        m.insert("fedisplacementmap", "feDisplacementMap");
        m.insert("fedistantlight", "feDistantLight");
        m.insert("fedropshadow", "feDropShadow");
        m.insert("feflood", "feFlood");
        m.insert("fefunca", "feFuncA");
        m.insert("fefuncb", "feFuncB");
        m.insert("fefuncg", "feFuncG");
        m.insert("fefuncr", "feFuncR");
        m.insert("fegaussianblur", "feGaussianBlur");
        m.insert("feimage", "feImage");
        m.insert("femerge", "feMerge");
        m.insert("femergenode", "feMergeNode");
        m.insert("femorphology", "feMorphology");
        m.insert("feoffset", "feOffset");
        m.insert("fepointlight", "fePointLight");
        m.insert("fespecularlighting", "feSpecularLighting");
        m.insert("fespotlight", "feSpotLight");
        m.insert("fetile", "feTile");
        m.insert("feturbulence", "feTurbulence");
        m.insert("foreignobject", "foreignObject");
        m.insert("glyphref", "glyphRef");
        m.insert("lineargradient", "linearGradient");
        m.insert("radialgradient", "radialGradient");
        m.insert("textpath", "textPath");
        m
    };

    /// MathML foreign attributes with a camelCase spelling; the real
    /// grammar's table has exactly one entry of consequence.
    static ref MATHML_ATTRIBUTE_ADJUSTMENTS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("definitionurl", "definitionURL");
        m
    };
}

fn adjust_attributes(attributes: &mut [Attribute], table: &HashMap<&'static str, &'static str>) {
    for attr in attributes.iter_mut() {
        if let Some(adjusted) = table.get(attr.name.as_str()) {
            attr.name = (*adjusted).to_string();
        }
    }
}

fn adjust_tag_name(name: &mut String, table: &HashMap<&'static str, &'static str>) {
    if let Some(adjusted) = table.get(name.as_str()) {
        *name = (*adjusted).to_string();
    }
}

/// A pull-based producer of `Token`s; implemented by `Tokenizer` and by
/// anything else shaped like it (spec §4.4's "wraps any token producer").
pub trait TokenSource {
    fn read_next(&mut self) -> Result<bool, FatalParseError>;
    fn current(&self) -> Option<&Token>;
}

impl TokenSource for crate::tokenizer::Tokenizer {
    fn read_next(&mut self) -> Result<bool, FatalParseError> {
        crate::tokenizer::Tokenizer::read_next(self)
    }

    fn current(&self) -> Option<&Token> {
        crate::tokenizer::Tokenizer::current(self)
    }
}

/// Which foreign-content subtree is currently active. Disjoint by
/// construction: entering one while the other's depth is \>= 0 cannot
/// happen in a well-formed token stream (spec §4.4's "never overlap").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Foreign {
    None,
    Svg,
    MathMl,
}

/// Wraps a token source and rewrites tag names/attributes inside SVG and
/// MathML subtrees (spec §4.4, component 7). Deliberately a `next()`-style
/// struct rather than a `std::iter::Iterator` impl, matching spec §9's
/// "no implicit coroutine" design note for the tokenizer itself.
pub struct ForeignContentWrapper<S> {
    source: S,
    svg_depth: i32,
    mathml_depth: i32,
    current: Option<Token>,
}

impl<S: TokenSource> ForeignContentWrapper<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            svg_depth: -1,
            mathml_depth: -1,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    fn active(&self) -> Foreign {
        if self.svg_depth >= 0 {
            Foreign::Svg
        } else if self.mathml_depth >= 0 {
            Foreign::MathMl
        } else {
            Foreign::None
        }
    }

    pub fn read_next(&mut self) -> Result<bool, FatalParseError> {
        let more = self.source.read_next()?;
        let mut token = self.source.current().cloned().expect("read_next produced a token");
        self.adjust(&mut token);
        self.current = Some(token);
        Ok(more)
    }

    fn adjust(&mut self, token: &mut Token) {
        match &mut token.kind {
            TokenKind::StartTag {
                name,
                attributes,
                self_closing,
            } => self.adjust_start_tag(name, attributes, *self_closing),
            TokenKind::EndTag { name, .. } => self.adjust_end_tag(name),
            _ => {}
        }
    }

    fn adjust_start_tag(&mut self, name: &mut String, attributes: &mut [Attribute], self_closing: bool) {
        match self.active() {
            Foreign::None => {
                if name == "svg" {
                    adjust_tag_name(name, &SVG_TAG_NAME_ADJUSTMENTS);
                    adjust_attributes(attributes, &SVG_ATTRIBUTE_ADJUSTMENTS);
                    if !self_closing {
                        self.svg_depth = 0;
                    }
                } else if name == "math" {
                    adjust_attributes(attributes, &MATHML_ATTRIBUTE_ADJUSTMENTS);
                    if !self_closing {
                        self.mathml_depth = 0;
                    }
                }
            }
            Foreign::Svg => {
                adjust_tag_name(name, &SVG_TAG_NAME_ADJUSTMENTS);
                adjust_attributes(attributes, &SVG_ATTRIBUTE_ADJUSTMENTS);
                if !self_closing {
                    self.svg_depth += 1;
                }
            }
            Foreign::MathMl => {
                adjust_attributes(attributes, &MATHML_ATTRIBUTE_ADJUSTMENTS);
                if !self_closing {
                    self.mathml_depth += 1;
                }
            }
        }
    }

    fn adjust_end_tag(&mut self, name: &mut String) {
        match self.active() {
            Foreign::None => {}
            Foreign::Svg => {
                adjust_tag_name(name, &SVG_TAG_NAME_ADJUSTMENTS);
                self.svg_depth -= 1;
            }
            Foreign::MathMl => {
                self.mathml_depth -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn collect(input: &str) -> Vec<TokenKind> {
        let mut wrapper = ForeignContentWrapper::new(Tokenizer::from_str(input));
        let mut out = Vec::new();
        loop {
            let more = wrapper.read_next().expect("no fatal errors in these fixtures");
            out.push(wrapper.current().unwrap().kind.clone());
            if !more {
                break;
            }
        }
        out
    }

    #[test]
    fn svg_entry_adjusts_viewbox_attribute() {
        let kinds = collect(r#"<svg viewbox="0 0 1 1"></svg>"#);
        match &kinds[0] {
            TokenKind::StartTag { name, attributes, .. } => {
                assert_eq!(name, "svg");
                assert_eq!(attributes[0].name, "viewBox");
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn nested_self_closing_svg_element_does_not_change_depth() {
        // <svg><g/></svg>: svg enters depth 0, self-closing <g/> leaves it
        // at 0, the matching </svg> brings it back to -1 (spec §4.4 example 7).
        let kinds = collect("<svg><g/></svg>rest");
        assert_eq!(kinds[0].clone(), TokenKind::StartTag {
            name: "svg".into(),
            attributes: vec![],
            self_closing: false,
        });
        match &kinds[1] {
            TokenKind::StartTag { name, self_closing, .. } => {
                assert_eq!(name, "g");
                assert!(self_closing);
            }
            other => panic!("expected start tag, got {other:?}"),
        }
        match &kinds[2] {
            TokenKind::EndTag { name, .. } => assert_eq!(name, "svg"),
            other => panic!("expected end tag, got {other:?}"),
        }
        // Text after the closing tag is untouched, proving depth returned
        // to -1 rather than staying inside the foreign subtree.
        match &kinds[3] {
            TokenKind::Text(text) => assert_eq!(text, "rest"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn svg_foreign_object_tag_name_is_camel_cased() {
        let kinds = collect("<svg><foreignobject></foreignobject></svg>");
        match &kinds[1] {
            TokenKind::StartTag { name, .. } => assert_eq!(name, "foreignObject"),
            other => panic!("expected start tag, got {other:?}"),
        }
        match &kinds[2] {
            TokenKind::EndTag { name, .. } => assert_eq!(name, "foreignObject"),
            other => panic!("expected end tag, got {other:?}"),
        }
    }

    #[test]
    fn mathml_definitionurl_attribute_is_camel_cased() {
        let kinds = collect(r#"<math definitionurl="x"></math>"#);
        match &kinds[0] {
            TokenKind::StartTag { attributes, .. } => {
                assert_eq!(attributes[0].name, "definitionURL");
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn self_closing_svg_entry_is_adjusted_but_does_not_enter_depth() {
        let kinds = collect(r#"<svg viewbox="0 0 1 1"/>after"#);
        match &kinds[0] {
            TokenKind::StartTag { name, attributes, self_closing } => {
                assert_eq!(name, "svg");
                assert!(self_closing);
                assert_eq!(attributes[0].name, "viewBox");
            }
            other => panic!("expected start tag, got {other:?}"),
        }
        // Since there is no corresponding end tag, depth must never have
        // moved away from -1, so the following text is never touched.
        match &kinds[1] {
            TokenKind::Text(text) => assert_eq!(text, "after"),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
