//! Tag-name classification
//!
//! Every decision that depends on a tag name goes through the tables in this
//! module. The container set and the expression-language set are disjoint.

use std::fmt;

/// Steps whose nested step children are collected under `steps`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Multicast,
    When,
    Split,
    Otherwise,
    Aggregate,
    DoTry,
    DoCatch,
    DoFinally,
    Filter,
    IdempotentConsumer,
    Loop,
    Resequence,
    Step,
    Transacted,
    Choice,
}

const CONTAINERS: &[(&str, ContainerKind)] = &[
    ("multicast", ContainerKind::Multicast),
    ("when", ContainerKind::When),
    ("split", ContainerKind::Split),
    ("otherwise", ContainerKind::Otherwise),
    ("aggregate", ContainerKind::Aggregate),
    ("doTry", ContainerKind::DoTry),
    ("doCatch", ContainerKind::DoCatch),
    ("doFinally", ContainerKind::DoFinally),
    ("filter", ContainerKind::Filter),
    ("idempotentConsumer", ContainerKind::IdempotentConsumer),
    ("loop", ContainerKind::Loop),
    ("resequence", ContainerKind::Resequence),
    ("step", ContainerKind::Step),
    ("transacted", ContainerKind::Transacted),
    ("choice", ContainerKind::Choice),
];

impl ContainerKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        CONTAINERS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, kind)| *kind)
    }

    pub fn tag(self) -> &'static str {
        CONTAINERS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("", |(name, _)| *name)
    }

    /// Containers driven by a predicate or expression of their own
    pub const fn takes_expression(self) -> bool {
        matches!(
            self,
            Self::When
                | Self::Filter
                | Self::Split
                | Self::Loop
                | Self::IdempotentConsumer
                | Self::Resequence
                | Self::Aggregate
        )
    }
}

/// Expression and predicate languages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionLanguage {
    Constant,
    Simple,
    Groovy,
    Header,
    Java,
    XPath,
    XQuery,
    XTokenize,
    JsonPath,
    Method,
    Mvel,
    Ognl,
    Python,
    Ref,
    Spel,
    Tokenize,
    Variable,
    Datasonnet,
    ExchangeProperty,
}

const LANGUAGES: &[(&str, ExpressionLanguage)] = &[
    ("constant", ExpressionLanguage::Constant),
    ("simple", ExpressionLanguage::Simple),
    ("groovy", ExpressionLanguage::Groovy),
    ("header", ExpressionLanguage::Header),
    ("java", ExpressionLanguage::Java),
    ("xpath", ExpressionLanguage::XPath),
    ("xquery", ExpressionLanguage::XQuery),
    ("xtokenize", ExpressionLanguage::XTokenize),
    ("jsonpath", ExpressionLanguage::JsonPath),
    ("method", ExpressionLanguage::Method),
    ("mvel", ExpressionLanguage::Mvel),
    ("ognl", ExpressionLanguage::Ognl),
    ("python", ExpressionLanguage::Python),
    ("ref", ExpressionLanguage::Ref),
    ("spel", ExpressionLanguage::Spel),
    ("tokenize", ExpressionLanguage::Tokenize),
    ("variable", ExpressionLanguage::Variable),
    ("datasonnet", ExpressionLanguage::Datasonnet),
    ("exchangeProperty", ExpressionLanguage::ExchangeProperty),
];

impl ExpressionLanguage {
    pub fn from_tag(tag: &str) -> Option<Self> {
        LANGUAGES
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, language)| *language)
    }

    pub fn tag(self) -> &'static str {
        LANGUAGES
            .iter()
            .find(|(_, language)| *language == self)
            .map_or("", |(name, _)| *name)
    }
}

impl fmt::Display for ExpressionLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Classification of a step or child tag
///
/// Computed once per element and matched on by the normalizer, the YAML
/// builder and the YAML emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// Owns an ordered list of nested steps
    Container(ContainerKind),
    /// Expression-carrying child that is never a step, e.g. `onWhen`
    Clause,
    /// Expression language element
    Expression(ExpressionLanguage),
    Plain,
}

impl StepKind {
    pub fn classify(tag: &str) -> Self {
        if let Some(kind) = ContainerKind::from_tag(tag) {
            Self::Container(kind)
        } else if is_clause(tag) {
            Self::Clause
        } else if let Some(language) = ExpressionLanguage::from_tag(tag) {
            Self::Expression(language)
        } else {
            Self::Plain
        }
    }

    pub const fn is_container(self) -> bool {
        matches!(self, Self::Container(_))
    }

    /// Whether a bare `lang: text` scalar in this step's body is its expression
    pub const fn takes_scalar_expression(self) -> bool {
        match self {
            Self::Container(kind) => kind.takes_expression(),
            Self::Clause => true,
            Self::Expression(_) | Self::Plain => false,
        }
    }

    /// Whether this step writes its expression inline as `lang: {...}`
    /// instead of under an `expression:` key
    pub const fn inline_expression(self) -> bool {
        matches!(self, Self::Container(_) | Self::Clause)
    }
}

/// How a branch child is written in YAML
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplicity {
    /// Always a list, even with one occurrence
    List,
    /// A single value unless repeated
    Single,
}

const BRANCHES: &[(&str, &str, Multiplicity)] = &[
    ("choice", "when", Multiplicity::List),
    ("choice", "otherwise", Multiplicity::Single),
    ("doTry", "doCatch", Multiplicity::List),
    ("doTry", "doFinally", Multiplicity::Single),
];

/// Branch child `child` of `parent`, if the pair is a known branch
pub fn branch(parent: &str, child: &str) -> Option<Multiplicity> {
    BRANCHES
        .iter()
        .find(|(p, c, _)| *p == parent && *c == child)
        .map(|(_, _, multiplicity)| *multiplicity)
}

const CLAUSES: &[&str] = &[
    "correlationExpression",
    "completionPredicate",
    "completionSizeExpression",
    "completionTimeoutExpression",
    "onWhen",
    "retryWhile",
    "handled",
    "continued",
];

/// Expression-carrying children that are never steps
fn is_clause(tag: &str) -> bool {
    CLAUSES.contains(&tag)
}

const TEXT_CHILDREN: &[&str] = &["description", "exception"];

/// Tags whose YAML scalar value is written as an XML text child, not an attribute
pub fn is_text_child(tag: &str) -> bool {
    TEXT_CHILDREN.contains(&tag)
}

const SHORTHANDS: &[(&str, &str)] = &[
    ("to", "uri"),
    ("toD", "uri"),
    ("wireTap", "uri"),
    ("inOnly", "uri"),
    ("inOut", "uri"),
    ("log", "message"),
];

/// Attribute receiving a bare scalar body, e.g. `- to: log:out`
pub fn shorthand_attribute(kind: &str) -> Option<&'static str> {
    SHORTHANDS
        .iter()
        .find(|(name, _)| *name == kind)
        .map(|(_, attribute)| *attribute)
}

/// Keys with structural meaning in YAML bodies, plus the `item` wrapper the
/// XML writer inserts and strips again
pub const RESERVED_KEYS: &[&str] = &["steps", "children", "item", "expression", "text"];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_and_language_sets_are_disjoint() {
        for (tag, _) in CONTAINERS {
            assert!(ExpressionLanguage::from_tag(tag).is_none(), "{tag}");
        }
        for (tag, _) in LANGUAGES {
            assert!(ContainerKind::from_tag(tag).is_none(), "{tag}");
        }
    }

    #[test]
    fn test_tables_round_trip() {
        for (tag, kind) in CONTAINERS {
            assert_eq!(kind.tag(), *tag);
        }
        for (tag, language) in LANGUAGES {
            assert_eq!(language.tag(), *tag);
            assert_eq!(language.to_string(), *tag);
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            StepKind::classify("choice"),
            StepKind::Container(ContainerKind::Choice)
        );
        assert_eq!(
            StepKind::classify("exchangeProperty"),
            StepKind::Expression(ExpressionLanguage::ExchangeProperty)
        );
        assert_eq!(StepKind::classify("onWhen"), StepKind::Clause);
        assert_eq!(StepKind::classify("setHeader"), StepKind::Plain);
        assert!(StepKind::classify("doTry").is_container());
        assert!(!StepKind::classify("to").is_container());
        assert!(!StepKind::classify("handled").is_container());
    }

    #[test]
    fn test_branches_and_clauses() {
        assert_eq!(branch("choice", "when"), Some(Multiplicity::List));
        assert_eq!(branch("choice", "otherwise"), Some(Multiplicity::Single));
        assert_eq!(branch("doTry", "doCatch"), Some(Multiplicity::List));
        assert_eq!(branch("split", "when"), None);
        assert!(is_clause("completionPredicate"));
        assert!(!is_clause("when"));
    }

    #[test]
    fn test_expression_placement() {
        let placement = |tag: &str| {
            let kind = StepKind::classify(tag);
            (kind.takes_scalar_expression(), kind.inline_expression())
        };
        assert_eq!(placement("when"), (true, true));
        assert_eq!(placement("onWhen"), (true, true));
        assert_eq!(placement("choice"), (false, true));
        assert_eq!(placement("setHeader"), (false, false));
        assert_eq!(placement("setBody"), (false, false));
        assert_eq!(placement("simple"), (false, false));
        assert_eq!(shorthand_attribute("toD"), Some("uri"));
        assert_eq!(shorthand_attribute("log"), Some("message"));
        assert_eq!(shorthand_attribute("setBody"), None);
        assert!(is_reserved("steps"));
        assert!(is_reserved("item"));
        assert!(!is_reserved("uri"));
    }
}
