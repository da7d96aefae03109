pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod game;
pub mod scene;
pub mod vehicle;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{WebGlRenderingContext, HtmlCanvasElement, KeyboardEvent, MouseEvent, Request, RequestInit, RequestMode, Response, Window};
use std::cell::RefCell;
use std::rc::Rc;
use log::{info, warn};
use crate::config::{AppConfig, CONFIG_PATH};
use crate::engine::renderer::Renderer;
use crate::error::DemoError;
use crate::game::Demo;

thread_local! {
    static DEMO: RefCell<Option<Demo>> = RefCell::new(None);
}

fn with_demo(f: impl FnOnce(&mut Demo)) {
    DEMO.with(|d| {
        if let Some(demo) = d.borrow_mut().as_mut() {
            f(demo);
        }
    });
}

#[wasm_bindgen]
pub async fn init_demo() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or(DemoError::MissingElement("window"))?;
    let document = window.document().ok_or(DemoError::MissingElement("document"))?;
    let canvas = document.get_element_by_id("canvas")
        .ok_or(DemoError::MissingElement("canvas"))?
        .dyn_into::<HtmlCanvasElement>()?;
    fit_canvas(&window, &canvas);

    let gl = canvas
        .get_context("webgl")?
        .ok_or(DemoError::MissingElement("webgl context"))?
        .dyn_into::<WebGlRenderingContext>()?;

    let renderer = Renderer::new(gl)?;
    let config = load_config(&window).await;

    let demo = Demo::new(renderer, config)?;
    DEMO.with(|d| *d.borrow_mut() = Some(demo));

    wire_input(&window, &canvas)?;
    start_loop();

    info!("tank park running");
    Ok(())
}

async fn load_config(window: &Window) -> AppConfig {
    match fetch_text(window, CONFIG_PATH).await {
        Ok(text) => match AppConfig::from_json(&text) {
            Ok(config) => {
                info!("loaded config from {}", CONFIG_PATH);
                config
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                AppConfig::default()
            }
        },
        Err(e) => {
            warn!("no config at {} ({}); using defaults", CONFIG_PATH, e);
            AppConfig::default()
        }
    }
}

async fn fetch_text(window: &Window, url: &str) -> Result<String, DemoError> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts)?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request)).await?.dyn_into()?;
    if !resp.ok() {
        return Err(DemoError::Js(format!("HTTP {}", resp.status())));
    }
    let text = JsFuture::from(resp.text()?).await?;
    text.as_string().ok_or_else(|| DemoError::Js("response body is not text".to_string()))
}

fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) {
    let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(800.0);
    let height = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(600.0);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
}

fn wire_input(window: &Window, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if event.repeat() {
            return;
        }
        with_demo(|demo| {
            demo.start_audio();
            if demo.input.key_down(&event.code()) {
                event.prevent_default();
            }
        });
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();

    let keyup = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        with_demo(|demo| {
            demo.input.key_up(&event.code());
        });
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
    keyup.forget();

    let mousedown = Closure::wrap(Box::new(move |event: MouseEvent| {
        with_demo(|demo| {
            demo.start_audio();
            demo.input.mouse_down(event.button());
        });
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
    mousedown.forget();

    let mouseup = Closure::wrap(Box::new(move |event: MouseEvent| {
        with_demo(|demo| demo.input.mouse_up(event.button()));
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
    mouseup.forget();

    let move_window = window.clone();
    let mousemove = Closure::wrap(Box::new(move |event: MouseEvent| {
        let Some(body) = move_window.document().and_then(|d| d.body()) else {
            return;
        };
        let width = body.client_width() as f32;
        let height = body.client_height() as f32;
        with_demo(|demo| {
            demo.input.mouse_move(event.page_x() as f32, event.page_y() as f32, width, height);
        });
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
    mousemove.forget();

    let blur = Closure::wrap(Box::new(move || {
        with_demo(|demo| demo.suspend());
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
    blur.forget();

    let resize_window = window.clone();
    let resize_canvas = canvas.clone();
    let resize = Closure::wrap(Box::new(move || {
        fit_canvas(&resize_window, &resize_canvas);
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();

    Ok(())
}

fn start_loop() {
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        with_demo(|demo| {
            demo.update();
            demo.render();
            update_hud(demo);
        });
        if let Some(callback) = f.borrow().as_ref() {
            request_animation_frame(callback);
        };
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback);
    };
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
        warn!("requestAnimationFrame failed: {:?}", e);
    }
}

fn update_hud(demo: &Demo) {
    let telemetry = demo.telemetry();
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        if let Some(hud) = document.get_element_by_id("hud") {
            hud.set_inner_html(&format!(
                "Speed: {:.2} | Heading: {:.0}° | Dust: {}",
                telemetry.speed,
                telemetry.heading.to_degrees(),
                telemetry.active_dust
            ));
        }
    }
}

/// Current tank state as a plain JS object.
#[wasm_bindgen]
pub fn telemetry() -> Result<JsValue, JsValue> {
    let mut snapshot = None;
    with_demo(|demo| snapshot = Some(demo.telemetry()));
    match snapshot {
        Some(telemetry) => Ok(serde_wasm_bindgen::to_value(&telemetry)?),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen]
pub fn release_controls() {
    with_demo(|demo| demo.input.clear());
}
