use crate::algorithm::conflict::{Seleccion, secciones_en_conflicto};

/// Dado un grupo de candidatos por curso, intenta elegir exactamente una
/// sección por curso sin choques de horario.
///
/// Backtracking: primero los cursos con menos candidatos y, dentro de cada
/// grupo, las secciones en orden de (código, etiqueta). Devuelve la primera
/// asignación válida en el orden de los grupos de entrada.
pub fn select_non_conflicting_sections<'a>(grupos: &[Vec<Seleccion<'a>>]) -> Option<Vec<Seleccion<'a>>> {
    if grupos.is_empty() {
        return Some(Vec::new());
    }

    let ordenados: Vec<Vec<Seleccion<'a>>> = grupos
        .iter()
        .map(|g| {
            let mut v = g.clone();
            v.sort_by(|a, b| (&a.0.codigo, &a.1.seccion).cmp(&(&b.0.codigo, &b.1.seccion)));
            v
        })
        .collect();

    let mut orden: Vec<usize> = (0..ordenados.len()).collect();
    orden.sort_by_key(|&i| (ordenados[i].len(), i));

    let mut asignacion: Vec<Option<Seleccion<'a>>> = vec![None; ordenados.len()];
    let mut elegidas: Vec<Seleccion<'a>> = Vec::new();

    fn backtrack<'a>(
        pos: usize,
        orden: &[usize],
        grupos: &[Vec<Seleccion<'a>>],
        asignacion: &mut [Option<Seleccion<'a>>],
        elegidas: &mut Vec<Seleccion<'a>>,
    ) -> bool {
        if pos == orden.len() {
            return true;
        }
        let idx = orden[pos];
        for &candidata in &grupos[idx] {
            if elegidas.iter().any(|e| secciones_en_conflicto(e.1, candidata.1)) {
                continue;
            }
            elegidas.push(candidata);
            asignacion[idx] = Some(candidata);
            if backtrack(pos + 1, orden, grupos, asignacion, elegidas) {
                return true;
            }
            elegidas.pop();
            asignacion[idx] = None;
        }
        false
    }

    if backtrack(0, &orden, &ordenados, &mut asignacion, &mut elegidas) {
        asignacion.into_iter().collect()
    } else {
        None
    }
}
