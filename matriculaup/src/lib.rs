// Biblioteca raíz del crate `matriculaup`.
// Extracción de la oferta académica y la malla curricular desde tablas de PDF,
// y detección de choques de horario sobre el catálogo resultante.
pub mod algorithm;
pub mod api_json;
pub mod config;
pub mod error;
pub mod excel;
pub mod extraccion;
pub mod horario;
pub mod models;
pub mod server;

pub use error::{MatriculaError, Result};
pub use extraccion::documento::{detectar_ciclo, extraer_cursos, extraer_malla};
/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
