//! Estado del horario del usuario: qué sección eligió de cada curso.
//!
//! Sólo guarda claves (`course_code`, `section_label`); los cursos se
//! resuelven contra el catálogo cargado cada vez que se consultan, así un
//! catálogo nuevo descarta las selecciones que ya no existen.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::algorithm::conflict::{Seleccion, detectar_conflictos};
use crate::extraccion::celdas::creditos_a_numero;
use crate::models::{Curso, Seccion, SeleccionGuardada};

/// Resuelve selecciones guardadas contra el catálogo. Las que no calzan con
/// ningún curso o sección se descartan en silencio.
pub fn resolver_selecciones<'a>(catalogo: &'a [Curso], guardadas: &[SeleccionGuardada]) -> Vec<Seleccion<'a>> {
    guardadas
        .iter()
        .filter_map(|g| {
            let curso = catalogo.iter().find(|c| c.codigo == g.course_code)?;
            let seccion = curso.seccion(&g.section_label)?;
            Some((curso, seccion))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Horario {
    selecciones: Vec<SeleccionGuardada>,
}

impl Horario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruye un horario guardado quedándose sólo con lo que existe en
    /// el catálogo.
    pub fn desde_guardado(guardadas: Vec<SeleccionGuardada>, catalogo: &[Curso]) -> Self {
        let total = guardadas.len();
        let mut horario = Horario::new();
        for (curso, seccion) in resolver_selecciones(catalogo, &guardadas) {
            horario.agregar(curso, seccion);
        }
        if horario.selecciones.len() < total {
            debug!(descartadas = total - horario.selecciones.len(), "selecciones sin curso en el catálogo");
        }
        horario
    }

    /// Agrega la sección; `false` si ya estaba.
    pub fn agregar(&mut self, curso: &Curso, seccion: &Seccion) -> bool {
        let clave = SeleccionGuardada {
            course_code: curso.codigo.clone(),
            section_label: seccion.seccion.clone(),
        };
        if self.selecciones.contains(&clave) {
            return false;
        }
        self.selecciones.push(clave);
        true
    }

    /// Quita la sección; `false` si no había nada que quitar.
    pub fn quitar(&mut self, codigo: &str, seccion: &str) -> bool {
        let antes = self.selecciones.len();
        self.selecciones
            .retain(|s| !(s.course_code == codigo && s.section_label == seccion));
        self.selecciones.len() != antes
    }

    pub fn limpiar(&mut self) {
        self.selecciones.clear();
    }

    pub fn selecciones(&self) -> &[SeleccionGuardada] {
        &self.selecciones
    }

    pub fn is_empty(&self) -> bool {
        self.selecciones.is_empty()
    }

    pub fn resolver<'a>(&self, catalogo: &'a [Curso]) -> Vec<Seleccion<'a>> {
        resolver_selecciones(catalogo, &self.selecciones)
    }

    pub fn conflictos<'a>(&self, catalogo: &'a [Curso]) -> Vec<(&'a Curso, &'a Curso)> {
        detectar_conflictos(&self.resolver(catalogo))
    }

    pub fn creditos(&self, catalogo: &[Curso]) -> f64 {
        self.resolver(catalogo).iter().map(|(c, _)| creditos_a_numero(&c.creditos)).sum()
    }

    /// Huella de la selección actual (independiente del orden) para que quien
    /// llama pueda memorizar trabajo costoso.
    pub fn huella(&self) -> u64 {
        huella_selecciones(&self.selecciones)
    }
}

pub fn huella_selecciones(selecciones: &[SeleccionGuardada]) -> u64 {
    let mut claves: Vec<&SeleccionGuardada> = selecciones.iter().collect();
    claves.sort_by(|a, b| (&a.course_code, &a.section_label).cmp(&(&b.course_code, &b.section_label)));
    let mut hasher = DefaultHasher::new();
    claves.hash(&mut hasher);
    hasher.finish()
}
