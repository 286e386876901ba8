//! Integration tests for ai-translator-core
//!
//! These tests verify the end-to-end workflow:
//! - Template routing for every provider and style
//! - Fallback for unknown style and provider labels
//! - Failure handling at the dispatcher boundary
//! - PDF loading, chunked translation and output

use std::sync::{Arc, Mutex};

use ai_translator_core::{
    CompletionBackend, Error, OutputFormat, PdfDocument, PdfTranslator, Prompt, Provider, Result,
    Style, TranslateOptions, TranslationDispatcher, TranslationRequest, TranslationResult,
    TranslationSettings,
    translator::BackendInfo,
};
use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

// =============================================================================
// Mock Backend for Testing
// =============================================================================

/// Records every prompt it receives and answers without network calls.
struct MockBackend {
    provider: Provider,
    reply: Option<String>,
    calls: Mutex<Vec<(Prompt, f32)>>,
}

impl MockBackend {
    /// Echo the user message back with a prefix
    fn echo(provider: Provider) -> Arc<Self> {
        Arc::new(Self {
            provider,
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn replying(provider: Provider, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            provider,
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(Prompt, f32)> {
        self.calls.lock().unwrap().clone()
    }

    fn last_prompt(&self) -> Prompt {
        self.calls().last().expect("backend was not called").0.clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "mock",
            provider: self.provider,
            target: "mock".to_string(),
        }
    }

    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String> {
        self.calls.lock().unwrap().push((prompt.clone(), temperature));
        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| format!("[{}] {}", self.provider, prompt.user)))
    }
}

/// Always fails, like an unreachable provider.
struct FailingBackend {
    calls: Mutex<usize>,
}

impl FailingBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl CompletionBackend for FailingBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "failing",
            provider: Provider::Glm,
            target: "nowhere".to_string(),
        }
    }

    async fn complete(&self, _prompt: &Prompt, _temperature: f32) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        Err(Error::TranslationRequest("Mock translation failure".to_string()))
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

fn mock_dispatcher() -> (Arc<MockBackend>, Arc<MockBackend>, TranslationDispatcher) {
    let openai = MockBackend::echo(Provider::OpenAi);
    let glm = MockBackend::echo(Provider::Glm);
    let dispatcher = TranslationDispatcher::with_backends(openai.clone(), glm.clone());
    (openai, glm, dispatcher)
}

fn hello(style: &str, provider: &str) -> TranslationRequest {
    TranslationRequest::from_labels("Hello world", "English", "Chinese", style, provider)
}

/// Build a PDF with one line of text per page
fn build_test_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len()).unwrap();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Test Book"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

// =============================================================================
// Routing Tests
// =============================================================================

#[tokio::test]
async fn test_every_provider_and_style_routes_to_its_template() {
    let cases = [
        ("OpenAI", "小说", "using novel style"),
        ("OpenAI", "新闻稿", "using the style of a press release"),
        ("OpenAI", "文艺作家", "using the style of a literary writer"),
        ("OpenAI", "无", "Translates English to Chinese."),
        ("GLM", "小说", "尽量使用小说文体的措辞风格"),
        ("GLM", "新闻稿", "尽量使用新闻稿的措辞风格"),
        ("GLM", "文艺作家", "尽量使用文艺作家的措辞风格"),
        ("GLM", "无", "从English翻译成Chinese：\nHello world"),
    ];

    let mut seen = Vec::new();
    for (provider, style, fragment) in cases {
        let (openai, glm, dispatcher) = mock_dispatcher();
        let result = dispatcher.translate(&hello(style, provider)).await;
        assert!(result.success);

        let (used, unused) = if provider == "OpenAI" {
            (&openai, &glm)
        } else {
            (&glm, &openai)
        };
        assert!(unused.calls().is_empty(), "{provider}/{style} hit the wrong backend");

        let full = used.last_prompt().full_text();
        assert!(full.contains(fragment), "{provider}/{style}: {full:?} lacks {fragment:?}");
        seen.push(full);
    }

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 8, "every combination should produce a distinct prompt");
}

#[tokio::test]
async fn test_temperatures_follow_style() {
    let (openai, glm, dispatcher) = mock_dispatcher();

    for style in ["小说", "新闻稿", "文艺作家", "无"] {
        dispatcher.translate(&hello(style, "OpenAI")).await;
        dispatcher.translate(&hello(style, "GLM")).await;
    }

    let temps = |backend: &MockBackend| backend.calls().iter().map(|(_, t)| *t).collect::<Vec<_>>();
    assert_eq!(temps(&openai), vec![0.3, 0.0, 0.7, 0.0]);
    assert_eq!(temps(&glm), vec![3.0, 0.0, 7.0, 0.0]);
}

#[tokio::test]
async fn test_unknown_style_uses_unstyled_template() {
    for provider in ["OpenAI", "GLM"] {
        let (openai, glm, dispatcher) = mock_dispatcher();
        let request = hello("科幻", provider);
        assert_eq!(request.style, Style::None);

        let expected = dispatcher.prompt_for(&hello("无", provider));
        dispatcher.translate(&request).await;

        let backend = if provider == "OpenAI" { openai } else { glm };
        assert_eq!(backend.last_prompt(), expected);
    }
}

#[tokio::test]
async fn test_non_openai_provider_routes_to_glm() {
    for label in ["GLM", "glm", "openai", "ChatGLM", "", "Anthropic"] {
        let (openai, glm, dispatcher) = mock_dispatcher();
        let result = dispatcher.translate(&hello("小说", label)).await;

        assert!(result.success);
        assert!(openai.calls().is_empty(), "{label:?} should not reach OpenAI");
        assert_eq!(glm.calls().len(), 1);
    }
}

#[tokio::test]
async fn test_substitution_is_complete() {
    for provider in ["OpenAI", "GLM"] {
        for style in ["小说", "新闻稿", "文艺作家", "无"] {
            let (openai, glm, dispatcher) = mock_dispatcher();
            dispatcher.translate(&hello(style, provider)).await;

            let backend = if provider == "OpenAI" { &openai } else { &glm };
            let full = backend.last_prompt().full_text();

            for value in ["English", "Chinese", "Hello world"] {
                assert!(full.contains(value), "{full:?} lacks {value:?}");
            }
            for token in ["{source_language}", "{target_language}", "{text}"] {
                assert!(!full.contains(token), "{full:?} still has {token}");
            }
        }
    }
}

#[tokio::test]
async fn test_openai_sends_text_as_user_message() {
    let (openai, _glm, dispatcher) = mock_dispatcher();
    dispatcher.translate(&hello("新闻稿", "OpenAI")).await;

    let prompt = openai.last_prompt();
    assert_eq!(prompt.user, "Hello world");
    assert!(prompt.system.unwrap().starts_with("You are a translation expert"));
}

// =============================================================================
// Result Handling Tests
// =============================================================================

#[tokio::test]
async fn test_success_returns_model_output() {
    let openai = MockBackend::replying(Provider::OpenAi, "你好，世界");
    let glm = MockBackend::replying(Provider::Glm, "你好，世界");
    let dispatcher = TranslationDispatcher::with_backends(openai, glm);

    for provider in ["OpenAI", "GLM"] {
        let result = dispatcher.translate(&hello("无", provider)).await;
        assert_eq!(
            result,
            TranslationResult {
                text: "你好，世界".to_string(),
                success: true,
            }
        );
    }

    let (text, ok) = dispatcher
        .translate_labels("Hello world", "English", "Chinese", "小说", "OpenAI")
        .await;
    assert_eq!(text, "你好，世界");
    assert!(ok);
}

#[tokio::test]
async fn test_backend_failure_is_contained() {
    let failing = FailingBackend::new();
    let dispatcher = TranslationDispatcher::with_backends(failing.clone(), failing.clone());

    for provider in ["OpenAI", "GLM"] {
        let result = dispatcher.translate(&hello("文艺作家", provider)).await;
        assert_eq!(result, TranslationResult::failed());
        assert!(result.text.is_empty());
        assert!(!result.success);
    }

    // One attempt per call, no retries
    assert_eq!(*failing.calls.lock().unwrap(), 2);

    let err = dispatcher
        .translate_detailed(&hello("无", "GLM"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Mock translation failure"));
}

#[tokio::test]
async fn test_templates_are_built_once() {
    let (_openai, _glm, dispatcher) = mock_dispatcher();
    let request = hello("小说", "GLM");

    let first = Arc::clone(dispatcher.template_for(&request));
    for _ in 0..50 {
        dispatcher.translate(&request).await;
    }
    let second = dispatcher.template_for(&request);

    assert!(Arc::ptr_eq(&first, second));
    assert_eq!(dispatcher.templates().len(), 8);
}

#[tokio::test]
async fn test_dispatcher_is_shareable_across_tasks() {
    let (_openai, glm, dispatcher) = mock_dispatcher();
    let dispatcher = Arc::new(dispatcher);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                let request = TranslationRequest::new(
                    format!("chunk {i}"),
                    "English",
                    "Chinese",
                    Style::Press,
                    Provider::Glm,
                );
                dispatcher.translate(&request).await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().success);
    }
    assert_eq!(glm.calls().len(), 8);
}

// =============================================================================
// PDF Pipeline Tests
// =============================================================================

#[test]
fn test_pdf_loads_successfully() {
    let bytes = build_test_pdf(&["Hello world", "Second page"]);
    let doc = PdfDocument::from_bytes(&bytes).expect("Failed to load test PDF");

    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.title(), Some("Test Book"));
    assert!(doc.page_text(0).unwrap().contains("Hello"));
    assert!(doc.page_text(1).unwrap().contains("Second"));
    assert!(matches!(doc.page_text(2), Err(Error::PdfInvalidPage { .. })));
}

#[tokio::test]
async fn test_translate_document_with_mock() {
    let bytes = build_test_pdf(&["Hello world", "Second page"]);
    let doc = PdfDocument::from_bytes(&bytes).unwrap();

    let (openai, glm, dispatcher) = mock_dispatcher();
    let translator = PdfTranslator::with_dispatcher(Arc::new(dispatcher), TranslationSettings::default());

    let options = TranslateOptions {
        provider: Provider::Glm,
        style: Style::Novel,
        ..translator.default_options()
    };

    let progress = Arc::new(Mutex::new(Vec::new()));
    let progress_sink = Arc::clone(&progress);
    let translated = translator
        .translate_document(
            &doc,
            &options,
            None,
            Some(Box::new(move |done, total| progress_sink.lock().unwrap().push((done, total)))),
        )
        .await
        .expect("translation should succeed");

    assert_eq!(translated.pages.len(), 2);
    assert_eq!(translated.title.as_deref(), Some("Test Book"));
    assert!(translated.is_complete());
    assert!(openai.calls().is_empty());
    assert_eq!(glm.calls().len(), translated.chunk_count());
    assert_eq!(*progress.lock().unwrap(), vec![(1, 2), (2, 2)]);

    let first = &translated.pages[0].chunks[0];
    assert!(first.original.contains("Hello"));
    assert!(first.translated.starts_with("[glm] 假设你是一位擅长各国语言的翻译专家"));

    let markdown = translated.render(OutputFormat::Markdown);
    assert!(markdown.starts_with("# Test Book"));
    assert!(markdown.contains("## Page 2"));
}

#[tokio::test]
async fn test_selected_pages_only() {
    let doc = PdfDocument::from_page_texts(
        vec!["one".to_string(), "two".to_string(), "three".to_string()],
        None,
    );
    let (_openai, _glm, dispatcher) = mock_dispatcher();
    let translator = PdfTranslator::with_dispatcher(Arc::new(dispatcher), TranslationSettings::default());

    let translated = translator
        .translate_document(&doc, &translator.default_options(), Some(&[2, 0]), None)
        .await
        .unwrap();

    let pages: Vec<usize> = translated.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(pages, vec![2, 0]);

    let err = translator
        .translate_document(&doc, &translator.default_options(), Some(&[3]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PdfInvalidPage { page: 3, total: 3 }));
}

#[tokio::test]
async fn test_failed_chunks_do_not_abort_document() {
    let doc = PdfDocument::from_page_texts(
        vec!["para one\n\npara two".to_string(), String::new(), "last".to_string()],
        None,
    );
    let failing = FailingBackend::new();
    let dispatcher = TranslationDispatcher::with_backends(failing.clone(), failing);
    let translator = PdfTranslator::with_dispatcher(Arc::new(dispatcher), TranslationSettings::default());

    let options = TranslateOptions {
        max_chunk_chars: 10,
        concurrency: 4,
        ..translator.default_options()
    };
    let translated = translator
        .translate_document(&doc, &options, None, None)
        .await
        .unwrap();

    assert_eq!(translated.pages.len(), 3);
    assert_eq!(translated.pages[0].chunks.len(), 2);
    assert!(translated.pages[1].chunks.is_empty());
    assert_eq!(translated.failed_chunks(), 3);
    assert!(translated.pages.iter().flat_map(|p| &p.chunks).all(|c| c.translated.is_empty()));
    assert_eq!(translated.to_text(), "\n\u{c}\n\n\u{c}\n");
}

#[tokio::test]
async fn test_concurrent_chunks_keep_order() {
    let text = (0..20).map(|i| format!("paragraph {i}")).collect::<Vec<_>>().join("\n\n");
    let doc = PdfDocument::from_page_texts(vec![text], None);
    let (openai, _glm, dispatcher) = mock_dispatcher();
    let translator = PdfTranslator::with_dispatcher(Arc::new(dispatcher), TranslationSettings::default());

    let options = TranslateOptions {
        max_chunk_chars: 12,
        concurrency: 8,
        ..translator.default_options()
    };
    let page = translator.translate_page(&doc, 0, &options).await.unwrap();

    assert_eq!(page.chunks.len(), 20);
    for (i, chunk) in page.chunks.iter().enumerate() {
        assert_eq!(chunk.original, format!("paragraph {i}"));
        assert_eq!(chunk.translated, format!("[openai] paragraph {i}"));
    }
    assert_eq!(openai.calls().len(), 20);
}

#[tokio::test]
async fn test_save_output_file() {
    let doc = PdfDocument::from_page_texts(vec!["Hello world".to_string()], Some("Greeting".into()));
    let openai = MockBackend::replying(Provider::OpenAi, "你好，世界");
    let glm = MockBackend::echo(Provider::Glm);
    let translator = PdfTranslator::with_dispatcher(
        Arc::new(TranslationDispatcher::with_backends(openai, glm)),
        TranslationSettings::default(),
    );

    let translated = translator
        .translate_document(&doc, &translator.default_options(), None, None)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("greeting.md");
    translated.save(&path, OutputFormat::Markdown).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "# Greeting\n\n## Page 1\n\n你好，世界\n");
}
