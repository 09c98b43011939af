mod configuration;
mod cors_check;
mod subscribers;

pub use configuration::*;
pub use cors_check::*;
pub use subscribers::*;

/// JSON body used for every message-only response.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> MessageBody {
        MessageBody {
            message: message.into(),
        }
    }
}

pub fn error_chain_fmt(
    err: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}", err)?;

    let mut current = err.source();

    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }

    Ok(())
}
