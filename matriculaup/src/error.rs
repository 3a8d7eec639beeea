//! Errores de E/S y decodificación del crate.
//!
//! El parseo de filas nunca falla: los problemas de datos se reflejan como
//! valores (`Prerequisito::SinParsear`, advertencias en `Estadisticas`). Este
//! tipo sólo cubre lo que ocurre fuera del núcleo: leer archivos, decodificar
//! JSON o abrir hojas de cálculo.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MatriculaError {
    #[error("error de E/S en '{ruta}': {fuente}")]
    Io {
        ruta: PathBuf,
        #[source]
        fuente: std::io::Error,
    },

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no se pudo leer el libro Excel: {0}")]
    Excel(#[from] calamine::Error),

    #[error("tabla inválida en '{0}': formato de entrada no reconocido")]
    TablaInvalida(String),

    #[error("configuración inválida: {0}")]
    Config(String),
}

impl MatriculaError {
    pub fn io(ruta: impl Into<PathBuf>, fuente: std::io::Error) -> Self {
        MatriculaError::Io { ruta: ruta.into(), fuente }
    }
}

pub type Result<T> = std::result::Result<T, MatriculaError>;
