// Separación de la celda de docentes ("APELLIDO, Nombre / APELLIDO, Nombre").
use regex::Regex;

const SEPARADOR_DOCENTES: &str = " / ";

// Palabra capitalizada con tildes.
const PALABRA: &str = "[A-ZÁÉÍÓÚÑ][A-Za-záéíóúñÁÉÍÓÚÑ]*";

pub struct ParserDocentes {
    nombre: Regex,
}

impl Default for ParserDocentes {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserDocentes {
    pub fn new() -> Self {
        // Las preposiciones largas van primero: "Del Rosario" antes que "Del".
        let preposiciones = [
            format!(r"[Dd]el\s+{PALABRA}"),
            r"[Dd]el\b".to_string(),
            format!(r"[Dd]e\s+[Ll]os\s+{PALABRA}"),
            r"[Dd]e\s+[Ll]os\b".to_string(),
            format!(r"[Dd]e\s+[Ll]a\s+{PALABRA}"),
            r"[Dd]e\s+[Ll]a\b".to_string(),
            r"[Dd]e\b".to_string(),
            PALABRA.to_string(),
        ]
        .join("|");
        let apellidos = r"[A-ZÑÁÉÍÓÚ][A-ZÁÉÍÓÚÑ]*(?:\s+[A-ZÁÉÍÓÚÑ][A-ZÁÉÍÓÚÑ]*)*";
        let nombre = r"[A-ZÁÉÍÓÚÑ][A-Za-záéíóúñÁÉÍÓÚÑ]+";
        let patron = format!(r"^({apellidos},\s+{nombre}(?:\s+(?:{preposiciones}))*)");
        ParserDocentes {
            nombre: Regex::new(&patron).expect("patrón de docentes válido"),
        }
    }

    /// Un nombre por segmento. Lo que no calza con el patrón se conserva tal
    /// cual; nunca se pierde un docente.
    pub fn separar(&self, texto: &str) -> Vec<String> {
        let plano = texto.replace(['\r', '\n'], " ");
        let recortado = plano.trim();
        if recortado.is_empty() {
            return Vec::new();
        }

        let nombres: Vec<String> = recortado
            .split(SEPARADOR_DOCENTES)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|segmento| match self.nombre.captures(segmento) {
                Some(caps) => caps[1].trim().to_string(),
                None => segmento.to_string(),
            })
            .collect();

        if nombres.is_empty() {
            return vec![recortado.to_string()];
        }
        nombres
    }
}
