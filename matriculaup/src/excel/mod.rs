//! Fuente de tablas desde libros de hoja de cálculo (xlsx, xls, ods).
//!
//! Cada hoja del libro se trata como una página con una sola tabla, en el
//! orden en que aparecen las hojas.

mod io;

pub use io::{dato_a_celda, dato_a_texto, leer_hojas};

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::extraccion::documento::{DocumentoTablas, Pagina};

pub fn leer_documento_excel(ruta: &Path) -> Result<DocumentoTablas> {
    let hojas = leer_hojas(ruta)?;
    let paginas = hojas
        .into_iter()
        .map(|(nombre, tabla)| {
            debug!(hoja = %nombre, filas = tabla.len(), "hoja leída");
            Pagina { tablas: if tabla.is_empty() { Vec::new() } else { vec![tabla] } }
        })
        .collect();
    Ok(DocumentoTablas {
        fuente: ruta.file_name().map(|n| n.to_string_lossy().into_owned()),
        paginas,
    })
}
