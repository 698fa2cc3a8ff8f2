//! # Utilidades de logging para errores
//!
//! Registro de la cadena completa de `source()` de un error, usado sobre todo
//! alrededor de las llamadas a MongoDB.

use std::error::Error as StdError;

/// Recorre la cadena de errores y la registra con `tracing`
///
/// # Parámetros
/// - `error`: Error a analizar y registrar
/// - `context`: Contexto opcional (qué se estaba haciendo)
pub fn log_error_chain<E>(error: &E, context: Option<&str>)
where
    E: StdError + 'static,
{
    let error_chain = collect_chain(error);

    if let Some(ctx) = context {
        tracing::error!(
            context = %ctx,
            error_chain = ?error_chain,
            "Error with full chain (with context)"
        );
    } else {
        tracing::error!(error_chain = ?error_chain, "Error with full chain");
    }
}

fn collect_chain(error: &(dyn StdError + 'static)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);

    while let Some(err) = current {
        chain.push(err.to_string());
        current = err.source();
    }

    chain
}

/// Extension trait para Results que registra la cadena de errores
///
/// # Ejemplo de uso
/// ```ignore
/// collection
///     .insert_one(doc)
///     .await
///     .log_error_context("inserting waitlist entry")?;
/// ```
pub trait ErrorLogExt<T, E> {
    /// Loggea la cadena de errores con contexto adicional
    fn log_error_context(self, context: &str) -> Result<T, E>;
}

impl<T, E> ErrorLogExt<T, E> for Result<T, E>
where
    E: StdError + 'static,
{
    fn log_error_context(self, context: &str) -> Result<T, E> {
        if let Err(ref error) = self {
            log_error_chain(error, Some(context));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AppError;

    #[test]
    fn chain_includes_every_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disco lleno");
        let wrapped = mongodb::error::Error::from(io);
        let error = AppError::database("insert_barber", wrapped);

        let chain = collect_chain(&error);
        assert!(chain.len() >= 2);
        assert!(chain[0].contains("insert_barber"));
    }

    #[test]
    fn log_error_context_passes_result_through() {
        let ok: Result<u8, std::io::Error> = Ok(3);
        assert_eq!(ok.log_error_context("nada").unwrap(), 3);

        let err: Result<u8, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert!(err.log_error_context("algo").is_err());
    }
}
