use std::fmt;

use thiserror::Error;

use crate::ast::Node;

pub const ERROR_TAG: &str = "\x1b[31m[error]\x1b[0m";

/// Where an error happened. The form is the innermost list under
/// evaluation, the offset is a byte position in the source text.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub form: Option<Node>,
    pub offset: Option<usize>,
}

impl ErrorContext {
    pub fn set_form(&mut self, form: Node) {
        if self.form.is_none() {
            self.form = Some(form);
        }
    }

    pub fn set_offset(&mut self, offset: usize) {
        if self.offset.is_none() {
            self.offset = Some(offset);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorData {
    pub message: String,
    pub context: ErrorContext,
}

impl ErrorData {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorData {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }
}

impl fmt::Display for ErrorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(form) = &self.context.form {
            write!(f, ": {}", form)?;
        } else if let Some(offset) = self.context.offset {
            write!(f, " at offset {}", offset)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone)]
pub enum SorrelError {
    #[error("{0}")]
    Lex(ErrorData),
    #[error("{0}")]
    Parse(ErrorData),
    #[error("{0}")]
    UnboundSymbol(ErrorData),
    #[error("{0}")]
    Redefine(ErrorData),
    #[error("{0}")]
    Arity(ErrorData),
    #[error("{0}")]
    Bind(ErrorData),
    #[error("{0}")]
    NotCallable(ErrorData),
    #[error("cannot convert {value} to {target}")]
    Coerce {
        value: String,
        target: String,
        context: ErrorContext,
    },
    #[error("{0}")]
    Interop(ErrorData),
    #[error("{0}")]
    Cycle(ErrorData),
    #[error("{0}")]
    Thrown(ErrorData),
    #[error("{0}")]
    Interrupted(ErrorData),
    #[error("{0}")]
    Eval(ErrorData),
}

impl SorrelError {
    pub fn lex(message: impl Into<String>) -> Self {
        SorrelError::Lex(ErrorData::new(message))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        SorrelError::Parse(ErrorData::new(message))
    }

    pub fn unbound_symbol(message: impl Into<String>) -> Self {
        SorrelError::UnboundSymbol(ErrorData::new(message))
    }

    pub fn redefine(message: impl Into<String>) -> Self {
        SorrelError::Redefine(ErrorData::new(message))
    }

    pub fn arity(message: impl Into<String>) -> Self {
        SorrelError::Arity(ErrorData::new(message))
    }

    pub fn bind(message: impl Into<String>) -> Self {
        SorrelError::Bind(ErrorData::new(message))
    }

    pub fn not_callable(message: impl Into<String>) -> Self {
        SorrelError::NotCallable(ErrorData::new(message))
    }

    pub fn coerce(value: &Node, target: impl Into<String>) -> Self {
        SorrelError::Coerce {
            value: value.to_string(),
            target: target.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn interop(message: impl Into<String>) -> Self {
        SorrelError::Interop(ErrorData::new(message))
    }

    pub fn cycle(message: impl Into<String>) -> Self {
        SorrelError::Cycle(ErrorData::new(message))
    }

    pub fn thrown(message: impl Into<String>) -> Self {
        SorrelError::Thrown(ErrorData::new(message))
    }

    pub fn interrupted(message: impl Into<String>) -> Self {
        SorrelError::Interrupted(ErrorData::new(message))
    }

    pub fn eval(message: impl Into<String>) -> Self {
        SorrelError::Eval(ErrorData::new(message))
    }

    /// Attach the evaluated form. The first (innermost) caller wins,
    /// outer frames leave an already filled context alone.
    pub fn with_form(mut self, form: Node) -> Self {
        self.context_mut().set_form(form);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.context_mut().set_offset(offset);
        self
    }

    pub fn form(&self) -> Option<&Node> {
        self.context_ref().form.as_ref()
    }

    pub fn context_ref(&self) -> &ErrorContext {
        match self {
            SorrelError::Lex(data)
            | SorrelError::Parse(data)
            | SorrelError::UnboundSymbol(data)
            | SorrelError::Redefine(data)
            | SorrelError::Arity(data)
            | SorrelError::Bind(data)
            | SorrelError::NotCallable(data)
            | SorrelError::Interop(data)
            | SorrelError::Cycle(data)
            | SorrelError::Thrown(data)
            | SorrelError::Interrupted(data)
            | SorrelError::Eval(data) => &data.context,
            SorrelError::Coerce { context, .. } => context,
        }
    }

    pub fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            SorrelError::Lex(data)
            | SorrelError::Parse(data)
            | SorrelError::UnboundSymbol(data)
            | SorrelError::Redefine(data)
            | SorrelError::Arity(data)
            | SorrelError::Bind(data)
            | SorrelError::NotCallable(data)
            | SorrelError::Interop(data)
            | SorrelError::Cycle(data)
            | SorrelError::Thrown(data)
            | SorrelError::Interrupted(data)
            | SorrelError::Eval(data) => &mut data.context,
            SorrelError::Coerce { context, .. } => context,
        }
    }
}

pub fn format_error(err: &SorrelError) -> String {
    format!("{} {}", ERROR_TAG, err)
}
