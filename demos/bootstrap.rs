use dragon_web::dump::{dump, DumpMode};
use dragon_web::{mime, route, AppContext, Error, NamespaceLoader, Paths};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Mailer {
    from: String,
}

/// Runs one request through bootstrap and returns the response to write.
fn handle(host: &str, uri: &str) -> Result<http::Response<String>, Error> {
    let request = http::Request::builder()
        .uri(uri)
        .header("host", host)
        .body(())
        .map_err(|_| Error::MissingRequest)?;

    let mut loader = NamespaceLoader::new();
    let ctx = AppContext::builder()
        .with_paths(Paths::builder("demos").resolve())
        .with_request(request)
        .build(&mut loader)?;

    let mailer = ctx.get_or_create_instance("mailer", || Mailer {
        from: ctx
            .config()
            .get_or("mail.from", "noreply@localhost".to_string()),
    });
    ctx.set("user", "alice".to_string());

    let target = route("blog", "post", "show", [("id", "7")]);
    let body = format!(
        "session {} in {} at {} (debug={}) from {}\nhandler {:?}\nroute {}\nuser {}\ntype {}\n{:.6}s\n",
        ctx.session_id(),
        ctx.timezone().name(),
        ctx.now().format("%H:%M:%S"),
        ctx.is_debug(),
        mailer.from,
        loader.resolve("app::controller::Post"),
        target,
        ctx.get("user", String::new()),
        mime::mime_type_or_default("json"),
        ctx.calc_app_time(),
    );

    if ctx.request().uri().query() == Some("dump") {
        dump(&[&target, &mailer], DumpMode::Web)?;
    }

    Ok(http::Response::new(body))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let requests = [
        ("localhost:8080", "/blog/post/show?id=7"),
        ("localhost:8080", "/blog/post/show?dump"),
        ("evil.com", "/blog/post/show?id=7"),
    ];
    for (host, uri) in requests {
        let response = match handle(host, uri) {
            Ok(response) => response,
            Err(Error::Halt(halt)) => halt.into_response(),
            Err(e) => {
                eprintln!("bootstrap failed: {e}");
                continue;
            }
        };
        println!("{host}{uri} {}\n{}", response.status(), response.body());
    }
}
