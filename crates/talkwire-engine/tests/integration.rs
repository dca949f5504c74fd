use talkwire_core::ModelSource;
use talkwire_engine::{
    EngineRegistry, RecognizerEngine, RecognizerSession, ScriptedEngine, ScriptedFrame,
};

fn frame(decodes: u32, endpoint: bool, result: &str) -> ScriptedFrame {
    ScriptedFrame {
        decode_passes: decodes,
        is_endpoint: endpoint,
        result: result.to_string(),
    }
}

#[test]
fn test_registry_built_engine_drives_a_session() {
    let script = vec![
        frame(1, false, "good"),
        frame(1, false, "good morning"),
        frame(1, true, "good morning"),
    ];
    let source = ModelSource {
        model: "scripted".to_string(),
        module: Vec::new(),
        data: ScriptedEngine::encode_script(&script),
    };

    let registry = EngineRegistry::new();
    let mut engine = registry.create(&source).unwrap();
    let stream = engine.create_stream();
    let mut session = RecognizerSession::new(engine, stream);

    let r1 = session.reconcile(16000, &[0.0; 1024]);
    assert_eq!(r1.text, "good");
    assert!(!r1.is_endpoint);

    let r2 = session.reconcile(16000, &[0.0; 1024]);
    assert_eq!(r2.text, " morning");

    let r3 = session.reconcile(16000, &[0.0; 1024]);
    assert!(r3.is_endpoint);
    assert_eq!(r3.sentence, "good morning");
    assert_eq!(session.last_text(), "");
}

#[test]
fn test_two_sessions_do_not_share_state() {
    let make = |text: &str| {
        let mut engine = ScriptedEngine::with_script(vec![frame(1, false, text)]);
        let stream = engine.create_stream();
        RecognizerSession::new(Box::new(engine), stream)
    };
    let mut a = make("alpha");
    let mut b = make("beta");

    assert_eq!(a.reconcile(16000, &[0.0]).text, "alpha");
    // If reconciler state were shared, "beta" would be stripped against
    // "alpha"'s observation.
    assert_eq!(b.reconcile(16000, &[0.0]).text, "beta");
    assert_eq!(a.last_text(), "alpha");
    assert_eq!(b.last_text(), "beta");
}

#[test]
fn test_multiple_utterances_in_sequence() {
    let mut engine = ScriptedEngine::with_script(vec![
        frame(1, false, "one"),
        frame(1, true, "one"),
        frame(1, false, "two"),
        frame(1, true, "two"),
    ]);
    let stream = engine.create_stream();
    let mut session = RecognizerSession::new(Box::new(engine), stream);

    let mut sentences = Vec::new();
    for _ in 0..4 {
        let r = session.reconcile(16000, &[0.0; 256]);
        if r.is_endpoint && !r.sentence.is_empty() {
            sentences.push(r.sentence);
        }
    }
    assert_eq!(sentences, vec!["one", "two"]);
}
