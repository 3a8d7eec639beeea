// Normalización de celdas crudas del detector de tablas.
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Celda tal como la entrega el detector: texto o nulo.
pub type Celda = Option<String>;
pub type Fila = Vec<Celda>;
pub type Tabla = Vec<Fila>;

/// `None` -> "", texto -> recortado.
pub fn normalizar_celda(celda: &Celda) -> String {
    celda.as_deref().map(str::trim).unwrap_or("").to_string()
}

pub fn normalizar_fila(fila: &[Celda]) -> Vec<String> {
    fila.iter().map(normalizar_celda).collect()
}

pub fn fila_vacia(celdas: &[String]) -> bool {
    celdas.iter().all(|c| c.is_empty())
}

/// Acceso con verificación de límites; fuera de rango equivale a celda vacía.
pub fn celda(celdas: &[String], idx: usize) -> &str {
    celdas.get(idx).map(String::as_str).unwrap_or("")
}

/// Colapsa saltos de línea y espacios repetidos en un único espacio.
pub fn unir_lineas(texto: &str) -> String {
    texto.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn sin_acentos(texto: &str) -> String {
    texto.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Clave de comparación: sin tildes, mayúsculas y recortada.
pub fn clave_normalizada(texto: &str) -> String {
    sin_acentos(texto.trim()).to_uppercase()
}

/// Créditos en texto con punto decimal ("4,5" -> "4.5").
pub fn normalizar_creditos(texto: &str) -> String {
    texto.trim().replace(',', ".")
}

/// Valor numérico de los créditos; lo que no se puede leer cuenta como 0.
pub fn creditos_a_numero(texto: &str) -> f64 {
    normalizar_creditos(texto).parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celdas_nulas_y_recortadas() {
        let fila: Fila = vec![Some("  A ".into()), None, Some("".into())];
        assert_eq!(normalizar_fila(&fila), vec!["A", "", ""]);
        assert!(fila_vacia(&normalizar_fila(&[None, Some("  ".into())])));
    }

    #[test]
    fn acceso_fuera_de_rango() {
        let celdas = vec!["A".to_string()];
        assert_eq!(celda(&celdas, 0), "A");
        assert_eq!(celda(&celdas, 7), "");
    }

    #[test]
    fn claves_y_creditos() {
        assert_eq!(clave_normalizada(" Miércoles "), "MIERCOLES");
        assert_eq!(unir_lineas("CASTROMATTA,\nMilagros  Del\nRosario"), "CASTROMATTA, Milagros Del Rosario");
        assert_eq!(normalizar_creditos("4,5"), "4.5");
        assert_eq!(creditos_a_numero("4,5"), 4.5);
        assert_eq!(creditos_a_numero("s/n"), 0.0);
    }
}
