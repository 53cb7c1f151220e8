use courier_derive::courier_error;
use std::borrow::Cow;

#[courier_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Sequence error{}: {message}", format_context(.context))]
    Sequence { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk")).context("reading settings")
}

fn fail() -> Result<(), DemoError> {
    Err(DemoError::Sequence { message: "too early".into(), context: None })
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (reading settings): disk");

    let err = fail().context("publishing").unwrap_err();
    assert_eq!(err.to_string(), "Sequence error (publishing): too early");

    let err: DemoError = "boom".into();
    assert_eq!(err.to_string(), "Internal error: boom");
}
