// This file is part of AAKit.
//
// AAKit is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// AAKit is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with AAKit.
// If not, see https://www.gnu.org/licenses/.

//! Helper traits for logging errors as they are propagated

use std::fmt::{Debug, Display};

use tracing::Level;

/// Log an error and wrap it with context
pub trait LogWithContext<T> {
    /// Log the original error, then wrap it in an [`anyhow::Error`] with the given context
    fn log_context<C>(self, context: C) -> anyhow::Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Same as [`LogWithContext::log_context`], building the context lazily
    fn log_with_context<C, F>(self, context: F) -> anyhow::Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

/// Log an error while keeping its original type
pub trait LogOnError {
    /// Log at `ERROR` if this is an error
    fn log_on_error<C: Display>(self, context: C) -> Self;

    /// Log at `level` if this is an error
    fn log_on_error_level<C: Display>(self, level: Level, context: C) -> Self;
}

impl<T, E> LogWithContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn log_context<C>(self, context: C) -> anyhow::Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.log_with_context(|| context)
    }

    fn log_with_context<C, F>(self, context: F) -> anyhow::Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| {
            let context = context();
            tracing::error!("{context}: {error:?}");
            anyhow::Error::new(error).context(context)
        })
    }
}

impl<T, E: Debug> LogOnError for Result<T, E> {
    fn log_on_error<C: Display>(self, context: C) -> Self {
        self.log_on_error_level(Level::ERROR, context)
    }

    fn log_on_error_level<C: Display>(self, level: Level, context: C) -> Self {
        if let Err(error) = &self {
            log_at_level(level, &format!("{context}: {error:?}"));
        }
        self
    }
}

fn log_at_level(level: Level, message: &str) {
    match level {
        Level::TRACE => tracing::trace!("{message}"),
        Level::DEBUG => tracing::debug!("{message}"),
        Level::INFO => tracing::info!("{message}"),
        Level::WARN => tracing::warn!("{message}"),
        Level::ERROR => tracing::error!("{message}"),
    }
}
