// Detección de choques de horario entre secciones seleccionadas.
use crate::extraccion::celdas::clave_normalizada;
use crate::models::{Curso, Seccion, Sesion};

/// Una selección del usuario: curso y la sección elegida.
pub type Seleccion<'a> = (&'a Curso, &'a Seccion);

fn mismo_dia(a: &str, b: &str) -> bool {
    clave_normalizada(a) == clave_normalizada(b)
}

/// Dos sesiones chocan si son del mismo grupo (clases o exámenes), caen el
/// mismo día y los intervalos `[inicio, fin)` se intersectan.
pub fn sesiones_se_solapan(a: &Sesion, b: &Sesion) -> bool {
    let (Some(grupo_a), Some(grupo_b)) = (a.tipo.grupo(), b.tipo.grupo()) else {
        return false;
    };
    if grupo_a != grupo_b || !mismo_dia(&a.dia, &b.dia) {
        return false;
    }
    a.hora_inicio.max(b.hora_inicio) < a.hora_fin.min(b.hora_fin)
}

/// Primer par de sesiones que choca entre dos secciones.
pub fn primer_solapamiento<'a>(a: &'a Seccion, b: &'a Seccion) -> Option<(&'a Sesion, &'a Sesion)> {
    a.sesiones
        .iter()
        .flat_map(|sa| b.sesiones.iter().map(move |sb| (sa, sb)))
        .find(|(sa, sb)| sesiones_se_solapan(sa, sb))
}

pub fn secciones_en_conflicto(a: &Seccion, b: &Seccion) -> bool {
    primer_solapamiento(a, b).is_some()
}

/// Todos los pares de cursos en conflicto entre las selecciones. Cada par se
/// reporta ordenado por (código, sección), así el resultado no depende del
/// orden de entrada.
pub fn detectar_conflictos<'a>(selecciones: &[Seleccion<'a>]) -> Vec<(&'a Curso, &'a Curso)> {
    let mut pares = Vec::new();
    for (i, &(curso_a, seccion_a)) in selecciones.iter().enumerate() {
        for &(curso_b, seccion_b) in &selecciones[i + 1..] {
            if !secciones_en_conflicto(seccion_a, seccion_b) {
                continue;
            }
            let clave_a = (&curso_a.codigo, &seccion_a.seccion);
            let clave_b = (&curso_b.codigo, &seccion_b.seccion);
            if clave_a <= clave_b {
                pares.push((curso_a, curso_b));
            } else {
                pares.push((curso_b, curso_a));
            }
        }
    }
    pares
}
