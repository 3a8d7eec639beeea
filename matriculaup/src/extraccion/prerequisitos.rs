//! Prerequisitos: detección de texto truncado y parser de expresiones Y/O.
//!
//! El texto llega ya unido desde las filas de continuación. El parser es
//! total: si alguna parte no se reduce a una expresión o a una referencia de
//! curso, toda la expresión queda como `Prerequisito::SinParsear`.

use regex::Regex;
use tracing::debug;

use crate::models::{Operador, Prerequisito, RefCurso};

const FINALES_TRUNCADOS: [&str; 7] = [" Y (", " O (", "Y(", "O(", " Y", " O", "("];
const SEPARADOR_Y: &str = " Y ";
const SEPARADOR_O: &str = " O ";
const PROFUNDIDAD_MAXIMA: usize = 64;

/// `true` si el texto termina a mitad de expresión (falta una fila de
/// continuación).
pub fn es_prerequisito_truncado(texto: &str) -> bool {
    let recortado = texto.trim_end();
    FINALES_TRUNCADOS.iter().any(|f| recortado.ends_with(f))
}

#[derive(Debug)]
enum FalloParseo {
    SinReferencia(String),
    Parentesis(String),
    Profundidad,
}

pub struct ParserPrerequisitos {
    hoja: Regex,
}

impl Default for ParserPrerequisitos {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserPrerequisitos {
    pub fn new() -> Self {
        ParserPrerequisitos {
            hoja: Regex::new(r"(?s)^(\d{6})\s+(.+)$").expect("patrón de hoja válido"),
        }
    }

    pub fn parsear(&self, texto: &str) -> Prerequisito {
        let limpio = texto.trim();
        match self.expresion(limpio, 0) {
            Ok(nodo) => nodo,
            Err(fallo) => {
                debug!(?fallo, texto = limpio, "prerequisito no estructurado");
                Prerequisito::sin_parsear(limpio)
            }
        }
    }

    fn expresion(&self, texto: &str, profundidad: usize) -> Result<Prerequisito, FalloParseo> {
        if profundidad > PROFUNDIDAD_MAXIMA {
            return Err(FalloParseo::Profundidad);
        }
        let texto = texto.trim();

        for (separador, op) in [(SEPARADOR_Y, Operador::And), (SEPARADOR_O, Operador::Or)] {
            let partes = dividir_nivel_superior(texto, separador);
            if partes.len() > 1 {
                let items = partes
                    .into_iter()
                    .map(|p| self.expresion(p, profundidad + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Prerequisito::Expresion { op, items });
            }
        }

        if let Some(interior) = quitar_parentesis_externos(texto) {
            return self.expresion(interior, profundidad + 1);
        }

        self.referencia(texto)
    }

    fn referencia(&self, texto: &str) -> Result<Prerequisito, FalloParseo> {
        let caps = self
            .hoja
            .captures(texto)
            .ok_or_else(|| FalloParseo::SinReferencia(texto.to_string()))?;
        let nombre = caps[2].trim();
        if !parentesis_balanceados(nombre) {
            return Err(FalloParseo::Parentesis(texto.to_string()));
        }
        Ok(Prerequisito::Hoja {
            items: vec![RefCurso { codigo: caps[1].to_string(), nombre: nombre.to_string() }],
        })
    }
}

/// Corta en cada aparición de `separador` fuera de paréntesis. Las partes
/// vacías se descartan.
fn dividir_nivel_superior<'a>(texto: &'a str, separador: &str) -> Vec<&'a str> {
    let bytes = texto.as_bytes();
    let sep = separador.as_bytes();
    let mut profundidad: i32 = 0;
    let mut cortes = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => profundidad += 1,
            b')' => profundidad -= 1,
            _ if profundidad == 0
                && bytes[i..].starts_with(sep)
                && (i == 0 || bytes[i - 1] != b'(') =>
            {
                cortes.push(i);
                i += sep.len();
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    let mut partes = Vec::with_capacity(cortes.len() + 1);
    let mut inicio = 0;
    for corte in cortes {
        partes.push(&texto[inicio..corte]);
        inicio = corte + sep.len();
    }
    partes.push(&texto[inicio..]);
    partes.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// Devuelve el interior si el texto está envuelto por un único par de
/// paréntesis cuyo cierre es el último carácter.
fn quitar_parentesis_externos(texto: &str) -> Option<&str> {
    if !texto.starts_with('(') || !texto.ends_with(')') {
        return None;
    }
    let mut profundidad = 0i32;
    for (i, c) in texto.char_indices() {
        match c {
            '(' => profundidad += 1,
            ')' => {
                profundidad -= 1;
                if profundidad == 0 {
                    return (i == texto.len() - 1).then(|| &texto[1..i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parentesis_balanceados(texto: &str) -> bool {
    let mut profundidad = 0i32;
    for c in texto.chars() {
        match c {
            '(' => profundidad += 1,
            ')' => {
                profundidad -= 1;
                if profundidad < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    profundidad == 0
}
