use std::fmt;

use super::Span;

/// Diagnostic kinds, grouped by the phase that reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Syntax errors in grammar or transform text
    UnexpectedToken,
    ExpectedName,
    ExpectedItem,
    ExpectedExpression,
    UnclosedGroup,
    UnclosedBlock,
    MixedChoiceOperators,
    InvalidQuantifier,
    UnknownDirective,
    MissingOverride,

    // Grammar definition errors
    DuplicateGrammar,
    UnresolvedGrammar,
    AmbiguousGrammar,
    ExtendsCycle,
    DuplicateRule,
    NoSuperRule,
    AmbiguousRule,
    AppendToNonLongestChoice,
    UndefinedRule,
    LeafRuleCycle,
    InvalidLeafPattern,

    // Transform override problems
    UnknownTransformGrammar,
    UnknownTransformRule,
    UnknownType,
    MissingTransformRule,
    UnknownProperty,
    MissingRuleGenerated,
    TypeCreated,
}

/// Pipeline phase a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Parse,
    GrammarResolution,
    TransformResolution,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnknownProperty => Severity::Warning,
            Self::MissingRuleGenerated | Self::TypeCreated => Severity::Information,
            _ => Severity::Error,
        }
    }

    pub fn phase(&self) -> Phase {
        if *self < Self::DuplicateGrammar {
            Phase::Parse
        } else if *self < Self::UnknownTransformGrammar {
            Phase::GrammarResolution
        } else {
            Phase::TransformResolution
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnexpectedToken => "unexpected token",
            Self::ExpectedName => "expected a name",
            Self::ExpectedItem => "expected a rule item",
            Self::ExpectedExpression => "expected an expression",
            Self::UnclosedGroup => "missing closing `)`",
            Self::UnclosedBlock => "missing closing `}`",
            Self::MixedChoiceOperators => "choice operators cannot be mixed",
            Self::InvalidQuantifier => "invalid quantifier",
            Self::UnknownDirective => "unknown directive",
            Self::MissingOverride => "`+=|` requires `override`",

            Self::DuplicateGrammar => "duplicate grammar",
            Self::UnresolvedGrammar => "unresolved grammar reference",
            Self::AmbiguousGrammar => "ambiguous grammar reference",
            Self::ExtendsCycle => "grammar extends itself",
            Self::DuplicateRule => "duplicate rule",
            Self::NoSuperRule => "no super rule to override",
            Self::AmbiguousRule => "ambiguous rule to override",
            Self::AppendToNonLongestChoice => {
                "alternatives can only be appended to a `|` choice"
            }
            Self::UndefinedRule => "undefined rule",
            Self::LeafRuleCycle => "leaf rule refers to itself",
            Self::InvalidLeafPattern => "leaf rule compresses to an invalid pattern",

            Self::UnknownTransformGrammar => "transform for unknown grammar",
            Self::UnknownTransformRule => "transform for unknown rule",
            Self::UnknownType => "unknown type",
            Self::MissingTransformRule => "missing transform rule",
            Self::UnknownProperty => "unknown property",
            Self::MissingRuleGenerated => "missing transform rule generated",
            Self::TypeCreated => "type created",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateGrammar => "grammar `{}` is already defined".to_string(),
            Self::UnresolvedGrammar => "grammar `{}` is not defined".to_string(),
            Self::ExtendsCycle => "grammar `{}` extends itself".to_string(),
            Self::DuplicateRule => "rule `{}` is already defined".to_string(),
            Self::NoSuperRule => "no super rule `{}` to override".to_string(),
            Self::AmbiguousRule => "rule `{}` is defined by several super grammars".to_string(),
            Self::UndefinedRule => "rule `{}` is not defined".to_string(),
            Self::LeafRuleCycle => "leaf rule `{}` refers to itself".to_string(),
            Self::UnknownTransformGrammar => "grammar `{}` is not defined".to_string(),
            Self::UnknownTransformRule => "rule `{}` is not defined in the grammar".to_string(),
            Self::UnknownType => "type `{}` is not defined".to_string(),
            Self::MissingTransformRule => "no transform rule for `{}`".to_string(),
            Self::MissingRuleGenerated => "generated transform rule for `{}`".to_string(),
            Self::TypeCreated => "created type `{}`".to_string(),

            // Standard pattern: fallback + context
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Information,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub(crate) replacement: String,
    pub(crate) description: String,
}

impl Fix {
    pub fn new(replacement: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) span: Span,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) span: Option<Span>,
    pub(crate) message: String,
    pub(crate) fix: Option<Fix>,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self {
            kind,
            span,
            message: kind.fallback_message().to_string(),
            fix: None,
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn phase(&self) -> Phase {
        self.kind.phase()
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub(crate) fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{} at {}..{}: {}",
                self.severity(),
                u32::from(span.range.start()),
                u32::from(span.range.end()),
                self.message
            )?,
            None => write!(f, "{}: {}", self.severity(), self.message)?,
        }
        if let Some(fix) = &self.fix {
            write!(f, " (fix: {})", fix.description)?;
        }
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.span.range.start()),
                u32::from(related.span.range.end())
            )?;
        }
        Ok(())
    }
}
