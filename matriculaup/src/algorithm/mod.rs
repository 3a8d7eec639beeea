// Algoritmos sobre el catálogo ya extraído: choques de horario, selección de
// secciones compatibles y búsqueda.
pub mod busqueda;
pub mod conflict;
pub mod section_selector;

pub use busqueda::buscar_cursos;
pub use conflict::{Seleccion, detectar_conflictos, primer_solapamiento, secciones_en_conflicto, sesiones_se_solapan};
pub use section_selector::select_non_conflicting_sections;
