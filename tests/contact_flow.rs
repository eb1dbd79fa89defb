//! Contact submission against a throwaway HTTP listener standing in for the
//! form backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use scrollspy::contact::{
    ContactController, ContactForm, Field, FormBackend, FormspreeBackend, SubmitError, SubmitOutcome, ToastKind,
};

#[derive(Debug, Default, Clone)]
struct Captured {
    requests: Vec<(String, String)>, // (request head, body)
}

/// Serve `status` to every request, recording what arrived.
async fn stub_backend(status: u16) -> (String, Arc<Mutex<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Captured::default()));
    let sink = captured.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else { return };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let (head, body) = loop {
                let n = stream.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break (String::from_utf8_lossy(&buf).to_string(), String::new());
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let head = text[..split].to_string();
                    let len = head
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.trim()
                                .eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    let body = &text[split + 4..];
                    if body.len() >= len {
                        break (head, body.to_string());
                    }
                }
            };
            sink.lock().unwrap().requests.push((head, body));

            let reply = if (200..300).contains(&status) { r#"{"ok":true}"# } else { r#"{"error":"nope"}"# };
            let response = format!(
                "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reply.len(),
                reply
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{}/f", addr), captured)
}

fn backend(base: &str) -> FormspreeBackend {
    FormspreeBackend::new(base, "test-form", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn invalid_form_makes_no_request() {
    let (base, captured) = stub_backend(200).await;
    let mut controller = ContactController::new(backend(&base));
    controller.fill(ContactForm::new("not-an-email", "short"));

    let SubmitOutcome::Invalid(errors) = controller.submit(0).await else {
        panic!("expected local rejection");
    };
    assert_eq!(errors.get(Field::Email), Some("Invalid email address"));
    assert_eq!(errors.get(Field::Message), Some("Message must be at least 10 characters"));
    assert!(captured.lock().unwrap().requests.is_empty());
}

#[tokio::test]
async fn valid_form_posts_json_once_and_clears() {
    let (base, captured) = stub_backend(200).await;
    let mut controller = ContactController::new(backend(&base));
    controller.fill(ContactForm::new("a@b.com", "this is a valid message"));

    assert_eq!(controller.submit(1_000).await, SubmitOutcome::Sent);

    let captured = captured.lock().unwrap().clone();
    assert_eq!(captured.requests.len(), 1);
    let (head, body) = &captured.requests[0];
    assert!(head.starts_with("POST /f/test-form "));
    assert!(head.to_ascii_lowercase().contains("content-type: application/json"));
    let sent: ContactForm = serde_json::from_str(body).unwrap();
    assert_eq!(sent, ContactForm::new("a@b.com", "this is a valid message"));

    assert!(controller.form().is_empty());
    let toast = controller.toasts().latest().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.message, "Message sent successfully!");
}

#[tokio::test]
async fn rejected_submission_keeps_values() {
    let (base, captured) = stub_backend(500).await;
    let mut controller = ContactController::new(backend(&base));
    let form = ContactForm::new("a@b.com", "this is a valid message");
    controller.fill(form.clone());

    assert_eq!(controller.submit(0).await, SubmitOutcome::Failed);
    assert_eq!(captured.lock().unwrap().requests.len(), 1);
    assert_eq!(controller.form(), &form);
    let toast = controller.toasts().latest().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert_eq!(toast.message, "Failed to send message. Please try again.");
}

#[tokio::test]
async fn backend_surfaces_status_and_transport_errors() {
    let (base, _) = stub_backend(422).await;
    let err = backend(&base)
        .submit(&ContactForm::new("a@b.com", "this is a valid message"))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Rejected { status: 422, .. }));

    // Nothing listens on port 9 of the loopback interface.
    let err = backend("http://127.0.0.1:9/f")
        .submit(&ContactForm::new("a@b.com", "this is a valid message"))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
}
