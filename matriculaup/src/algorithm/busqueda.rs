// Búsqueda de cursos en el catálogo por código o nombre.
use crate::extraccion::celdas::clave_normalizada;
use crate::models::Curso;

/// Cursos cuyo código o nombre contiene todas las palabras del término
/// (sin distinguir tildes ni mayúsculas), ordenados por similitud
/// Jaro-Winkler con el término y luego por código. Un término vacío
/// devuelve el catálogo completo en su orden original.
pub fn buscar_cursos<'a>(catalogo: &'a [Curso], termino: &str) -> Vec<&'a Curso> {
    let termino = clave_normalizada(termino);
    let palabras: Vec<&str> = termino.split_whitespace().collect();
    if palabras.is_empty() {
        return catalogo.iter().collect();
    }

    let mut encontrados: Vec<(f64, &Curso)> = catalogo
        .iter()
        .filter_map(|curso| {
            let nombre = clave_normalizada(&curso.nombre);
            let texto = format!("{} {}", curso.codigo, nombre);
            if !palabras.iter().all(|p| texto.contains(p)) {
                return None;
            }
            let puntaje = strsim::jaro_winkler(&termino, &nombre).max(strsim::jaro_winkler(&termino, &curso.codigo));
            Some((puntaje, curso))
        })
        .collect();

    encontrados.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.codigo.cmp(&b.1.codigo)));
    encontrados.into_iter().map(|(_, c)| c).collect()
}
