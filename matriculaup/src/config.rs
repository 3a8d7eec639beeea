//! Configuración desde variables de entorno (y `.env` si existe).
//!
//! Variables reconocidas:
//! - `MATRICULA_SALIDA_DIR`: directorio donde se escriben los JSON (por defecto `input`)
//! - `MATRICULA_BIND`: dirección del servidor HTTP (por defecto `127.0.0.1:8080`)
//! - `MATRICULA_CATALOGO`: JSON de cursos que carga el servidor (opcional)
//! - `MATRICULA_UMBRAL_ERROR`: tasa de advertencias tolerada (por defecto `0.01`)

use std::path::PathBuf;

use crate::error::{MatriculaError, Result};

pub const UMBRAL_ERROR_POR_DEFECTO: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub salida_dir: PathBuf,
    pub bind: String,
    pub catalogo: Option<PathBuf>,
    pub umbral_error: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            salida_dir: PathBuf::from("input"),
            bind: "127.0.0.1:8080".to_string(),
            catalogo: None,
            umbral_error: UMBRAL_ERROR_POR_DEFECTO,
        }
    }
}

// carga .env si está presente; se ignora cuando no existe
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

impl Config {
    /// Lee la configuración del entorno del proceso.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::desde_variables(|clave| std::env::var(clave).ok())
    }

    /// Versión parametrizable: recibe el lector de variables para poder
    /// probarla sin tocar el entorno real.
    pub fn desde_variables<F>(leer: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();
        let valor = |clave: &str| leer(clave).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(dir) = valor("MATRICULA_SALIDA_DIR") {
            cfg.salida_dir = PathBuf::from(dir);
        }
        if let Some(bind) = valor("MATRICULA_BIND") {
            cfg.bind = bind;
        }
        cfg.catalogo = valor("MATRICULA_CATALOGO").map(PathBuf::from);
        if let Some(umbral) = valor("MATRICULA_UMBRAL_ERROR") {
            let parsed = umbral
                .parse::<f64>()
                .map_err(|_| MatriculaError::Config(format!("MATRICULA_UMBRAL_ERROR no numérico: '{}'", umbral)))?;
            if !(0.0..=1.0).contains(&parsed) {
                return Err(MatriculaError::Config(format!(
                    "MATRICULA_UMBRAL_ERROR fuera de rango [0, 1]: {}",
                    parsed
                )));
            }
            cfg.umbral_error = parsed;
        }
        Ok(cfg)
    }
}
