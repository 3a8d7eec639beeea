//! Núcleo de extracción: de filas crudas del detector de tablas a cursos,
//! secciones y sesiones (oferta) o a grupos por ciclo (malla curricular).
//!
//! Orden de dependencias: `celdas` -> `clasificador` -> `prerequisitos` y
//! `docentes` -> `constructor` -> `documento`. `malla` es un constructor
//! paralelo para las tablas del plan de estudios y `efe` otro para la oferta
//! de experiencias formativas.

pub mod celdas;
pub mod clasificador;
pub mod constructor;
pub mod docentes;
pub mod documento;
pub mod efe;
pub mod malla;
pub mod prerequisitos;

pub use celdas::{Celda, Fila, Tabla};
pub use constructor::{ConstructorCursos, Estadisticas};
pub use documento::{
    DocumentoTablas, Pagina, PlanEstudios, ResultadoCursos, ResultadoMalla, detectar_ciclo, extraer_cursos,
    extraer_malla,
};
