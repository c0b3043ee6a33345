use std::time::Instant;

use rocket::{
    fairing::{Fairing, Info, Kind},
    Data, Request, Response,
};

/// Logs every request on arrival and its duration once the response is ready.
pub struct RequestTimer;

#[derive(Copy, Clone)]
struct StartTime(Option<Instant>);

#[rocket::async_trait]
impl Fairing for RequestTimer {
    fn info(&self) -> Info {
        Info {
            name: "Request timer",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _: &mut Data<'_>) {
        tracing::info!(
            "{} {} -> {}",
            req.host().map(|h| h.to_string()).unwrap_or_default(),
            req.method(),
            req.uri()
        );
        req.local_cache(|| StartTime(Some(Instant::now())));
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let StartTime(start) = req.local_cache(|| StartTime(None));
        if let Some(start) = start {
            tracing::info!(
                "{} {} {} duration [{}s]",
                req.method(),
                req.uri(),
                res.status().code,
                start.elapsed().as_secs_f64()
            );
        }
    }
}
