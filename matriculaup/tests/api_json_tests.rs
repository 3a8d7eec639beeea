use actix_web::{App, test, web};
use chrono::NaiveTime;
use serde_json::{Value, json};

use matriculaup::api_json::{evaluar_horario, parse_selecciones};
use matriculaup::models::{Curso, Seccion, SeleccionGuardada, Sesion, TipoSesion};
use matriculaup::server::{EstadoServidor, configurar_rutas};

fn sesion(dia: &str, inicio: u32, fin: u32) -> Sesion {
    Sesion {
        tipo: TipoSesion::Clase,
        dia: dia.to_string(),
        hora_inicio: NaiveTime::from_hms_opt(inicio, 0, 0).unwrap(),
        hora_fin: NaiveTime::from_hms_opt(fin, 0, 0).unwrap(),
        aula: None,
    }
}

fn catalogo() -> Vec<Curso> {
    let curso = |codigo: &str, nombre: &str, secciones: Vec<(&str, Sesion)>| Curso {
        codigo: codigo.to_string(),
        nombre: nombre.to_string(),
        creditos: "4".to_string(),
        prerequisitos: None,
        secciones: secciones
            .into_iter()
            .map(|(etiqueta, s)| Seccion {
                seccion: etiqueta.to_string(),
                docentes: vec![],
                observaciones: String::new(),
                sesiones: vec![s],
            })
            .collect(),
    };
    vec![
        curso("138201", "Microeconomía I", vec![("A", sesion("LUN", 8, 10)), ("B", sesion("MAR", 8, 10))]),
        curso("166097", "Contabilidad Financiera I", vec![("A", sesion("LUN", 9, 11))]),
        curso("138105", "Matemáticas II", vec![("A", sesion("JUE", 14, 16))]),
    ]
}

#[::core::prelude::v1::test]
fn test_evaluar_horario_descarta_desconocidas() {
    let seleccion = parse_selecciones(
        r#"[
            {"course_code": "138201", "section_label": "A"},
            {"course_code": "166097", "section_label": "A"},
            {"course_code": "999999", "section_label": "A"},
            {"course_code": "138105", "section_label": "Z"}
        ]"#,
    )
    .expect("selecciones válidas");
    let evaluacion = evaluar_horario(&catalogo(), &seleccion);
    assert_eq!(evaluacion.seleccionadas.len(), 2);
    assert_eq!(evaluacion.descartadas.len(), 2);
    assert_eq!(evaluacion.creditos, 8.0);
    assert_eq!(evaluacion.conflictos.len(), 1);
    assert_eq!(evaluacion.conflictos[0].codigo_a, "138201");
    assert_eq!(evaluacion.conflictos[0].codigo_b, "166097");
    assert_eq!(evaluacion.huella.len(), 16);
}

#[::core::prelude::v1::test]
fn test_huella_no_depende_del_orden() {
    let a = SeleccionGuardada { course_code: "138201".into(), section_label: "B".into() };
    let b = SeleccionGuardada { course_code: "138105".into(), section_label: "A".into() };
    let uno = evaluar_horario(&catalogo(), &[a.clone(), b.clone()]);
    let dos = evaluar_horario(&catalogo(), &[b, a]);
    assert_eq!(uno.huella, dos.huella);
    assert!(uno.conflictos.is_empty());
}

#[actix_web::test]
async fn test_post_conflictos() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(EstadoServidor::new(catalogo())))
            .configure(configurar_rutas),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/conflictos")
        .set_json(json!({"selecciones": [
            {"course_code": "138201", "section_label": "A"},
            {"course_code": "166097", "section_label": "A"}
        ]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["conflictos"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["creditos"], 8.0);

    let req = test::TestRequest::post()
        .uri("/conflictos")
        .set_json(json!({"course_code": "138201"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_get_cursos() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(EstadoServidor::new(catalogo())))
            .configure(configurar_rutas),
    )
    .await;

    let req = test::TestRequest::get().uri("/cursos?q=microeconomia").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["cursos"][0]["codigo"], "138201");
    assert_eq!(body["cursos"][0]["secciones"], json!(["A", "B"]));

    let req = test::TestRequest::get().uri("/cursos/166097").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["secciones"][0]["sesiones"][0]["hora_inicio"], "09:00");

    let req = test::TestRequest::get().uri("/cursos/000000").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn test_post_extraer_cursos() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(EstadoServidor::new(Vec::new())))
            .configure(configurar_rutas),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/extraer/cursos")
        .set_json(json!({
            "ciclo": "2025-2",
            "paginas": [{"tablas": [[
                ["138201", "Microeconomia I", "4", null, null, null],
                ["A", "CLASE", "SMITH, John", "LUN", "08:00 - 10:00", "A-101"]
            ]]}]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["errores"], 0);
    assert_eq!(body["supera_umbral"], false);
    assert_eq!(body["documento"]["metadata"]["ciclo"], "2025-2");
    let curso = &body["documento"]["cursos"][0];
    assert_eq!(curso["codigo"], "138201");
    assert_eq!(curso["secciones"][0]["docentes"], json!(["SMITH, John"]));
    assert_eq!(curso["secciones"][0]["sesiones"][0]["hora_fin"], "10:00");
}

#[actix_web::test]
async fn test_post_extraer_efe() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(EstadoServidor::new(Vec::new())))
            .configure(configurar_rutas),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/extraer/efe")
        .set_json(json!({
            "ciclo": "2026-1",
            "paginas": [{"tablas": [[
                ["200123 - Futsal Mixto", null, null, null, null, null, null, null],
                ["A", "QUISPE, Rosa", "CLASE", "MAR", "18:00", "19:30", "25", null]
            ]]}]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["errores"], 0);
    let curso = &body["documento"]["cursos"][0];
    assert_eq!(curso["nombre"], "[EFE] Futsal Mixto");
    assert_eq!(curso["creditos"], "1");
    assert_eq!(curso["secciones"][0]["sesiones"][0]["hora_fin"], "19:30");
}
