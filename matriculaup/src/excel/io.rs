// Conversión de celdas de calamine al contrato de tablas del extractor.
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

use crate::error::{MatriculaError, Result};
use crate::extraccion::celdas::{Celda, Fila, Tabla};

const MINUTOS_POR_DIA: f64 = 1440.0;

/// Texto de una celda. Los flotantes enteros se imprimen sin decimales
/// ("4" y no "4.0") para que créditos y códigos lleguen como en el PDF.
pub fn dato_a_texto(dato: &Data) -> String {
    match dato {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(d) => fraccion_a_hora(d.as_f64()).unwrap_or_else(|| d.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}

/// Horas guardadas como fracción de día (0.3125 -> "07:30").
fn fraccion_a_hora(valor: f64) -> Option<String> {
    if !(0.0..1.0).contains(&valor) {
        return None;
    }
    let minutos = (valor * MINUTOS_POR_DIA).round() as u32;
    Some(format!("{:02}:{:02}", minutos / 60, minutos % 60))
}

/// Vacíos y errores de fórmula son celdas nulas.
pub fn dato_a_celda(dato: &Data) -> Celda {
    match dato {
        Data::Empty | Data::Error(_) => None,
        otro => Some(dato_a_texto(otro)),
    }
}

/// Todas las hojas del libro, en orden, como tablas de celdas.
pub fn leer_hojas(ruta: &Path) -> Result<Vec<(String, Tabla)>> {
    let mut libro = open_workbook_auto(ruta)?;
    let nombres = libro.sheet_names().to_owned();
    let mut hojas = Vec::with_capacity(nombres.len());
    for nombre in nombres {
        let rango = libro
            .worksheet_range(&nombre)
            .map_err(|e| MatriculaError::TablaInvalida(format!("{} [{}]: {}", ruta.display(), nombre, e)))?;
        let tabla: Tabla = rango
            .rows()
            .map(|fila| fila.iter().map(dato_a_celda).collect::<Fila>())
            .collect();
        hojas.push((nombre, tabla));
    }
    Ok(hojas)
}
