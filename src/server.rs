use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::{fs, io};

use chrono::Utc;
use ntex::web;
use ntex::web::HttpRequest;
use spdlog::{error, info};

use crate::assets::{asset_cache_control, content_type_for, etag_for, is_safe_asset_path, process_asset, ImageRequest, DEV_CACHE_CONTROL, HTML_CACHE_CONTROL};
use crate::config::ConfigHandle;
use crate::query_string::QueryString;
use crate::render::{robots_txt, RenderContext};

pub struct AppState {
    pub config: Arc<ConfigHandle>,
    pub dev_mode: bool,
}

impl AppState {
    fn context(&self) -> RenderContext {
        RenderContext::new(self.config.snapshot(), Utc::now())
    }

    fn page_cache_control(&self) -> &'static str {
        if self.dev_mode { DEV_CACHE_CONTROL } else { HTML_CACHE_CONTROL }
    }
}

type AppData = web::types::State<Arc<AppState>>;

fn html_response(state: &AppState, ctx: &RenderContext, rendered: io::Result<String>, not_found: &str) -> web::HttpResponse {
    match rendered {
        Ok(html) => web::HttpResponse::Ok()
            .header("Cache-Control", state.page_cache_control())
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) if e.kind() == ErrorKind::NotFound => not_found_response(state, ctx, not_found),
        Err(e) => {
            error!("Error rendering page: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering page: {}", e))
        }
    }
}

fn not_found_response(state: &AppState, ctx: &RenderContext, message: &str) -> web::HttpResponse {
    match ctx.render_error(message) {
        Ok(html) => web::HttpResponse::NotFound()
            .header("Cache-Control", state.page_cache_control())
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            error!("Error rendering error page: {}", e);
            web::HttpResponse::NotFound().body(message.to_string())
        }
    }
}

fn xml_response(state: &AppState, rendered: io::Result<Vec<u8>>, content_type: &str) -> web::HttpResponse {
    match rendered {
        Ok(xml) => web::HttpResponse::Ok()
            .header("Cache-Control", state.page_cache_control())
            .content_type(content_type)
            .body(xml),
        Err(e) => {
            error!("{}", e);
            web::HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

fn get_cur_page(req: &HttpRequest) -> i64 {
    QueryString::from_optional(req.uri().query()).get_page()
}

#[web::get("/")]
async fn index(state: AppData) -> web::HttpResponse {
    let ctx = state.context();
    let rendered = ctx.render_index();
    html_response(&state, &ctx, rendered, "Page not found")
}

#[web::get("/page/{slug}")]
async fn page(slug: web::types::Path<String>, state: AppData) -> web::HttpResponse {
    let ctx = state.context();
    let rendered = ctx.render_page(&slug.into_inner());
    html_response(&state, &ctx, rendered, "Page not found")
}

#[web::get("/posts")]
async fn list(req: HttpRequest, state: AppData) -> web::HttpResponse {
    let ctx = state.context();
    let rendered = ctx.render_post_list(get_cur_page(&req), None);
    html_response(&state, &ctx, rendered, "Page not found")
}

#[web::get("/posts/{slug}")]
async fn post(slug: web::types::Path<String>, state: AppData) -> web::HttpResponse {
    let ctx = state.context();
    let rendered = ctx.render_post(&slug.into_inner());
    html_response(&state, &ctx, rendered, "Post not found")
}

#[web::get("/tags/{tag}")]
async fn list_with_tag(req: HttpRequest, tag: web::types::Path<String>, state: AppData) -> web::HttpResponse {
    let ctx = state.context();
    let tag = tag.into_inner();
    let rendered = ctx.render_post_list(get_cur_page(&req), Some(&tag));
    html_response(&state, &ctx, rendered, "Page not found")
}

#[web::get("/feed.xml")]
async fn feed(state: AppData) -> web::HttpResponse {
    let ctx = state.context();
    xml_response(&state, ctx.render_feed(), "application/rss+xml; charset=utf-8")
}

#[web::get("/sitemap.xml")]
async fn sitemap(state: AppData) -> web::HttpResponse {
    let ctx = state.context();
    xml_response(&state, ctx.render_sitemap(), "application/xml; charset=utf-8")
}

#[web::get("/robots.txt")]
async fn robots(state: AppData) -> web::HttpResponse {
    let config = state.config.snapshot();
    web::HttpResponse::Ok()
        .header("Cache-Control", state.page_cache_control())
        .content_type("text/plain; charset=utf-8")
        .body(robots_txt(&config.site.url))
}

#[web::get("/humans.txt")]
async fn humans(state: AppData) -> web::HttpResponse {
    match fs::read_to_string("humans.txt") {
        Ok(content) => web::HttpResponse::Ok()
            .header("Cache-Control", state.page_cache_control())
            .content_type("text/plain; charset=utf-8")
            .body(content),
        Err(_) => web::HttpResponse::NotFound().body("humans.txt not found"),
    }
}

#[web::get("/assets/{path}*")]
async fn assets(req: HttpRequest, path: web::types::Path<String>, state: AppData) -> web::HttpResponse {
    let rel_path = path.into_inner();
    if !is_safe_asset_path(&rel_path) {
        return web::HttpResponse::Forbidden().body("Access forbidden");
    }

    let config = state.config.snapshot();
    let full_path: PathBuf = config.paths.assets_dir.join(&rel_path);
    let metadata = match fs::metadata(&full_path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return web::HttpResponse::NotFound().finish(),
    };

    let mut builder = web::HttpResponse::Ok();
    if state.dev_mode {
        builder.header("Cache-Control", DEV_CACHE_CONTROL);
    } else {
        let cache_control = asset_cache_control(&full_path);
        builder.header("Cache-Control", cache_control.as_str());

        if let Some(etag) = etag_for(&metadata) {
            let if_none_match = req.headers().get("If-None-Match").and_then(|v| v.to_str().ok());
            if if_none_match == Some(etag.as_str()) {
                return web::HttpResponse::NotModified()
                    .header("Cache-Control", cache_control.as_str())
                    .header("ETag", etag.as_str())
                    .finish();
            }
            builder.header("ETag", etag.as_str());
        }
    }

    let bytes = match fs::read(&full_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Error reading asset {}: {}", full_path.display(), e);
            return web::HttpResponse::InternalServerError().finish();
        }
    };

    let qs = QueryString::from_optional(req.uri().query());
    let image_request = ImageRequest {
        width: qs.get_dimension("w"),
        height: qs.get_dimension("h"),
        optimize: qs.get_bool("optimize"),
    };
    let body = process_asset(&full_path, bytes, &image_request, state.dev_mode);

    builder
        .content_type(content_type_for(&full_path).as_str())
        .body(body)
}

pub async fn server_run(config: Arc<ConfigHandle>, dev_mode: bool) -> io::Result<()> {
    let snapshot = config.snapshot();
    let bind_addr = snapshot.server.address.clone();
    let bind_port = snapshot.server.port;

    info!("Starting Podium on {}:{}{}", bind_addr, bind_port, if dev_mode { " (development mode)" } else { "" });

    let app_state = Arc::new(AppState {
        config,
        dev_mode,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(page)
            .service(list)
            .service(post)
            .service(list_with_tag)
            .service(feed)
            .service(sitemap)
            .service(robots)
            .service(humans)
            .service(assets)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
