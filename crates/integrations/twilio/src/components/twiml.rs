//! Session-less components that build a TwiML document.

use tracing::debug;
use twilink_component::{Component, ComponentError, ComponentSpec, PortSpec, Ports};

use super::optional_u32;
use crate::twiml::{Dial, Gather, Message, Play, Response, Say};

const TWIML_OUTPUT: &[PortSpec] = &[PortSpec::optional(
    "twiml",
    "TwiML document, usable as the 'twiml' input of twilio_make_call",
)];

static SAY: ComponentSpec = ComponentSpec {
    name: "twiml_say",
    description: "Build TwiML that speaks text to the caller",
    inputs: &[
        PortSpec::required("text", "Text to speak"),
        PortSpec::optional("voice", "Voice name (e.g. alice, Polly.Joanna)"),
        PortSpec::optional("language", "Language code (e.g. en-US)"),
        PortSpec::optional("loop", "Times to repeat; 0 repeats until hangup"),
    ],
    outputs: TWIML_OUTPUT,
};

static PLAY: ComponentSpec = ComponentSpec {
    name: "twiml_play",
    description: "Build TwiML that plays an audio file",
    inputs: &[
        PortSpec::required("url", "Audio file URL"),
        PortSpec::optional("loop", "Times to repeat; 0 repeats until hangup"),
    ],
    outputs: TWIML_OUTPUT,
};

static DIAL: ComponentSpec = ComponentSpec {
    name: "twiml_dial",
    description: "Build TwiML that forwards the call to another number",
    inputs: &[
        PortSpec::required("number", "Number to forward to"),
        PortSpec::optional("caller_id", "Caller ID presented to the callee"),
        PortSpec::optional("timeout", "Seconds to wait for an answer"),
    ],
    outputs: TWIML_OUTPUT,
};

static GATHER: ComponentSpec = ComponentSpec {
    name: "twiml_gather",
    description: "Build TwiML that prompts for keypad or speech input",
    inputs: &[
        PortSpec::required("prompt", "Text spoken while waiting for input"),
        PortSpec::optional("action", "URL receiving the collected input"),
        PortSpec::optional("input", "dtmf, speech, or \"dtmf speech\""),
        PortSpec::optional("num_digits", "Digits to collect before submitting"),
        PortSpec::optional("timeout", "Seconds of silence before submitting"),
    ],
    outputs: TWIML_OUTPUT,
};

static MESSAGE: ComponentSpec = ComponentSpec {
    name: "twiml_message",
    description: "Build TwiML that replies to an incoming message",
    inputs: &[
        PortSpec::required("body", "Reply text"),
        PortSpec::optional("to", "Recipient; defaults to the sender of the incoming message"),
        PortSpec::optional("from", "Sender; defaults to the number that received the message"),
        PortSpec::optional("media_url", "Media to attach"),
    ],
    outputs: TWIML_OUTPUT,
};

fn twiml_output(spec: &ComponentSpec, response: &Response) -> Ports {
    let xml = response.to_xml();
    debug!(component = spec.name, bytes = xml.len(), "built TwiML");
    Ports::new().with("twiml", xml)
}

/// `<Say>`
pub struct TwimlSay;

impl Component for TwimlSay {
    fn spec(&self) -> &'static ComponentSpec {
        &SAY
    }

    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let mut say = Say::new(inputs.require_string("text")?);
        if let Some(voice) = inputs.string("voice")? {
            say = say.voice(voice);
        }
        if let Some(language) = inputs.string("language")? {
            say = say.language(language);
        }
        if let Some(n) = optional_u32(inputs, "loop")? {
            say = say.loop_count(n);
        }
        Ok(twiml_output(&SAY, &Response::new().say(say)))
    }
}

/// `<Play>`
pub struct TwimlPlay;

impl Component for TwimlPlay {
    fn spec(&self) -> &'static ComponentSpec {
        &PLAY
    }

    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let mut play = Play::new(inputs.require_string("url")?);
        if let Some(n) = optional_u32(inputs, "loop")? {
            play = play.loop_count(n);
        }
        Ok(twiml_output(&PLAY, &Response::new().play(play)))
    }
}

/// `<Dial>`
pub struct TwimlDial;

impl Component for TwimlDial {
    fn spec(&self) -> &'static ComponentSpec {
        &DIAL
    }

    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let mut dial = Dial::new(inputs.require_string("number")?);
        if let Some(caller_id) = inputs.string("caller_id")? {
            dial = dial.caller_id(caller_id);
        }
        if let Some(secs) = optional_u32(inputs, "timeout")? {
            dial = dial.timeout(secs);
        }
        Ok(twiml_output(&DIAL, &Response::new().dial(dial)))
    }
}

/// `<Gather>` with a spoken prompt.
pub struct TwimlGather;

impl Component for TwimlGather {
    fn spec(&self) -> &'static ComponentSpec {
        &GATHER
    }

    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let mut gather = Gather::new().say(Say::new(inputs.require_string("prompt")?));
        if let Some(action) = inputs.string("action")? {
            gather = gather.action(action);
        }
        if let Some(input) = inputs.string("input")? {
            gather = gather.input(input);
        }
        if let Some(n) = optional_u32(inputs, "num_digits")? {
            gather = gather.num_digits(n);
        }
        if let Some(secs) = optional_u32(inputs, "timeout")? {
            gather = gather.timeout(secs);
        }
        Ok(twiml_output(&GATHER, &Response::new().gather(gather)))
    }
}

/// `<Message>`
pub struct TwimlMessage;

impl Component for TwimlMessage {
    fn spec(&self) -> &'static ComponentSpec {
        &MESSAGE
    }

    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let mut message = Message::new(inputs.require_string("body")?);
        if let Some(to) = inputs.string("to")? {
            message = message.to(to);
        }
        if let Some(from) = inputs.string("from")? {
            message = message.from(from);
        }
        if let Some(url) = inputs.string("media_url")? {
            message = message.media_url(url);
        }
        Ok(twiml_output(&MESSAGE, &Response::new().message(message)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

    async fn twiml(component: &impl Component, inputs: Ports) -> String {
        let outputs = component.execute(&inputs).await.unwrap();
        let xml = outputs.require_string("twiml").unwrap();
        xml.strip_prefix(DECL)
            .expect("missing XML declaration")
            .to_owned()
    }

    #[tokio::test]
    async fn say_builds_speech() {
        let xml = twiml(
            &TwimlSay,
            Ports::new()
                .with("text", "Your code is 1 2 3")
                .with("voice", "alice")
                .with("loop", json!(2)),
        )
        .await;
        assert_eq!(
            xml,
            r#"<Response><Say voice="alice" loop="2">Your code is 1 2 3</Say></Response>"#
        );
    }

    #[tokio::test]
    async fn say_ignores_blank_optional_ports() {
        let xml = twiml(
            &TwimlSay,
            Ports::new()
                .with("text", "Hi")
                .with("voice", "")
                .with("language", json!(null)),
        )
        .await;
        assert_eq!(xml, "<Response><Say>Hi</Say></Response>");
    }

    #[tokio::test]
    async fn play_builds_playback() {
        let xml = twiml(
            &TwimlPlay,
            Ports::new().with("url", "https://example.com/a.mp3"),
        )
        .await;
        assert_eq!(xml, "<Response><Play>https://example.com/a.mp3</Play></Response>");
    }

    #[tokio::test]
    async fn dial_builds_forwarding() {
        let xml = twiml(
            &TwimlDial,
            Ports::new()
                .with("number", "+15558675309")
                .with("caller_id", "+15551234567")
                .with("timeout", "15"),
        )
        .await;
        assert_eq!(
            xml,
            r#"<Response><Dial callerId="+15551234567" timeout="15">+15558675309</Dial></Response>"#
        );
    }

    #[tokio::test]
    async fn gather_wraps_prompt() {
        let xml = twiml(
            &TwimlGather,
            Ports::new()
                .with("prompt", "Press 1 for sales")
                .with("action", "https://example.com/menu?step=1&lang=en")
                .with("num_digits", json!(1)),
        )
        .await;
        assert_eq!(
            xml,
            "<Response><Gather action=\"https://example.com/menu?step=1&amp;lang=en\" numDigits=\"1\">\
             <Say>Press 1 for sales</Say></Gather></Response>"
        );
    }

    #[tokio::test]
    async fn message_builds_reply() {
        let xml = twiml(
            &TwimlMessage,
            Ports::new().with("body", "Thanks <3").with("to", "+15550001111"),
        )
        .await;
        assert_eq!(
            xml,
            r#"<Response><Message to="+15550001111">Thanks &lt;3</Message></Response>"#
        );
    }

    #[tokio::test]
    async fn message_strips_characters_xml_cannot_carry() {
        let xml = twiml(&TwimlMessage, Ports::new().with("body", "code\u{0}42\u{8}")).await;
        assert_eq!(xml, "<Response><Message>code42</Message></Response>");
    }

    #[tokio::test]
    async fn missing_required_port() {
        let err = TwimlSay.execute(&Ports::new()).await.unwrap_err();
        assert!(matches!(err, ComponentError::MissingInput(ref p) if p == "text"));
    }

    #[tokio::test]
    async fn bad_integer_port() {
        let err = TwimlPlay
            .execute(&Ports::new().with("url", "x").with("loop", "forever"))
            .await
            .unwrap_err();
        assert!(matches!(err, ComponentError::InvalidInput(_)));
    }
}
