use std::fmt;
use std::sync::Arc;

/// Caller-supplied notification for one asynchronous call.
///
/// Exactly one of the two methods runs, on the worker thread, before the
/// call's future can be observed as complete.
pub trait AsyncHandler<Req, Resp, E> {
    fn on_success(&self, request: &Req, response: &Resp);

    fn on_error(&self, error: &E);
}

impl<Req, Resp, E, H> AsyncHandler<Req, Resp, E> for Arc<H>
where
    H: AsyncHandler<Req, Resp, E> + ?Sized,
{
    fn on_success(&self, request: &Req, response: &Resp) {
        (**self).on_success(request, response)
    }

    fn on_error(&self, error: &E) {
        (**self).on_error(error)
    }
}

/// Handler built from a pair of closures. See [`handler_fn`].
pub struct FnHandler<S, F> {
    on_success: S,
    on_error: F,
}

pub fn handler_fn<Req, Resp, E, S, F>(on_success: S, on_error: F) -> FnHandler<S, F>
where
    S: Fn(&Req, &Resp),
    F: Fn(&E),
{
    FnHandler {
        on_success,
        on_error,
    }
}

impl<Req, Resp, E, S, F> AsyncHandler<Req, Resp, E> for FnHandler<S, F>
where
    S: Fn(&Req, &Resp),
    F: Fn(&E),
{
    fn on_success(&self, request: &Req, response: &Resp) {
        (self.on_success)(request, response)
    }

    fn on_error(&self, error: &E) {
        (self.on_error)(error)
    }
}

/// Reports call outcomes through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct TracingHandler {
    operation: &'static str,
}

impl TracingHandler {
    pub fn new(operation: &'static str) -> Self {
        Self { operation }
    }
}

impl<Req, Resp, E> AsyncHandler<Req, Resp, E> for TracingHandler
where
    Req: fmt::Debug,
    E: fmt::Display,
{
    fn on_success(&self, request: &Req, _response: &Resp) {
        tracing::debug!(operation = self.operation, ?request, "call succeeded");
    }

    fn on_error(&self, error: &E) {
        tracing::debug!(operation = self.operation, %error, "call failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl AsyncHandler<u32, String, String> for Recorder {
        fn on_success(&self, request: &u32, response: &String) {
            self.events
                .lock()
                .unwrap()
                .push(format!("ok {} {}", request, response));
        }

        fn on_error(&self, error: &String) {
            self.events.lock().unwrap().push(format!("err {}", error));
        }
    }

    #[test]
    fn test_fn_handler_routes_to_closures() {
        let seen = Mutex::new(Vec::new());
        let handler = handler_fn(
            |req: &u32, resp: &u32| seen.lock().unwrap().push(req + resp),
            |err: &u32| seen.lock().unwrap().push(*err),
        );

        AsyncHandler::<u32, u32, u32>::on_success(&handler, &1, &2);
        AsyncHandler::<u32, u32, u32>::on_error(&handler, &7);

        assert_eq!(*seen.lock().unwrap(), vec![3, 7]);
    }

    #[test]
    fn test_arc_handler_forwards() {
        let recorder = Arc::new(Recorder::default());
        let shared = Arc::clone(&recorder);

        shared.on_success(&5, &"five".to_string());
        shared.on_error(&"boom".to_string());

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["ok 5 five".to_string(), "err boom".to_string()]
        );
    }

    /// Collects formatted subscriber output.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_handler_does_not_log_parameter_values() {
        use crate::model::{ParameterType, PutParameterRequest, PutParameterResponse};

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let request = PutParameterRequest {
            name: "/app/db/password".to_string(),
            value: "hunter2-secret".to_string(),
            parameter_type: ParameterType::SecureString,
            description: None,
            overwrite: false,
        };
        let response = PutParameterResponse {
            version: 1,
            tier: None,
        };

        tracing::subscriber::with_default(subscriber, || {
            AsyncHandler::<_, _, String>::on_success(
                &TracingHandler::new("PutParameter"),
                &request,
                &response,
            );
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("PutParameter"));
        assert!(output.contains("/app/db/password"));
        assert!(!output.contains("hunter2-secret"));
    }
}
