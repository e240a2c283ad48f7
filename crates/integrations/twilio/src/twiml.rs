//! TwiML document builder.
//!
//! Builds the XML instructions Twilio fetches (or receives inline) to drive
//! a call or reply to a message:
//!
//! ```rust
//! use twilink_twilio::twiml::{Gather, Response, Say};
//!
//! let xml = Response::new()
//!     .gather(Gather::new().num_digits(1).say(Say::new("Press 1 for sales.")))
//!     .say(Say::new("We did not receive any input. Goodbye!"))
//!     .to_xml();
//! assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><Response><Gather"#));
//! ```

use std::fmt;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Text-to-speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Say {
    pub text: String,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub loop_count: Option<u32>,
}

impl Say {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            language: None,
            loop_count: None,
        }
    }

    #[must_use]
    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Times to repeat; `0` repeats until the call ends.
    #[must_use]
    pub fn loop_count(mut self, count: u32) -> Self {
        self.loop_count = Some(count);
        self
    }

    fn write(&self, w: &mut XmlWriter) {
        w.element(
            "Say",
            &[
                ("voice", self.voice.clone()),
                ("language", self.language.clone()),
                ("loop", self.loop_count.map(|n| n.to_string())),
            ],
            &self.text,
        );
    }
}

/// Audio file playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Play {
    pub url: String,
    pub loop_count: Option<u32>,
}

impl Play {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            loop_count: None,
        }
    }

    #[must_use]
    pub fn loop_count(mut self, count: u32) -> Self {
        self.loop_count = Some(count);
        self
    }

    fn write(&self, w: &mut XmlWriter) {
        w.element(
            "Play",
            &[("loop", self.loop_count.map(|n| n.to_string()))],
            &self.url,
        );
    }
}

/// Forward the call to another number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dial {
    pub number: String,
    pub caller_id: Option<String>,
    /// Seconds to wait for an answer.
    pub timeout: Option<u32>,
}

impl Dial {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            caller_id: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn caller_id(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, secs: u32) -> Self {
        self.timeout = Some(secs);
        self
    }

    fn write(&self, w: &mut XmlWriter) {
        w.element(
            "Dial",
            &[
                ("callerId", self.caller_id.clone()),
                ("timeout", self.timeout.map(|n| n.to_string())),
            ],
            &self.number,
        );
    }
}

/// A verb nested inside `<Gather>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatherPrompt {
    Say(Say),
    Play(Play),
    Pause(Option<u32>),
}

/// Collect keypad or speech input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gather {
    /// `dtmf`, `speech`, or `dtmf speech`.
    pub input: Option<String>,
    /// URL Twilio posts the collected input to.
    pub action: Option<String>,
    pub num_digits: Option<u32>,
    pub timeout: Option<u32>,
    pub prompts: Vec<GatherPrompt>,
}

impl Gather {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    #[must_use]
    pub fn action(mut self, url: impl Into<String>) -> Self {
        self.action = Some(url.into());
        self
    }

    #[must_use]
    pub fn num_digits(mut self, digits: u32) -> Self {
        self.num_digits = Some(digits);
        self
    }

    #[must_use]
    pub fn timeout(mut self, secs: u32) -> Self {
        self.timeout = Some(secs);
        self
    }

    #[must_use]
    pub fn say(mut self, say: Say) -> Self {
        self.prompts.push(GatherPrompt::Say(say));
        self
    }

    #[must_use]
    pub fn play(mut self, play: Play) -> Self {
        self.prompts.push(GatherPrompt::Play(play));
        self
    }

    #[must_use]
    pub fn pause(mut self, length: Option<u32>) -> Self {
        self.prompts.push(GatherPrompt::Pause(length));
        self
    }

    fn write(&self, w: &mut XmlWriter) {
        let attrs = [
            ("input", self.input.clone()),
            ("action", self.action.clone()),
            ("numDigits", self.num_digits.map(|n| n.to_string())),
            ("timeout", self.timeout.map(|n| n.to_string())),
        ];
        if self.prompts.is_empty() {
            w.empty("Gather", &attrs);
            return;
        }
        w.open("Gather", &attrs);
        for prompt in &self.prompts {
            match prompt {
                GatherPrompt::Say(say) => say.write(w),
                GatherPrompt::Play(play) => play.write(w),
                GatherPrompt::Pause(length) => write_pause(w, *length),
            }
        }
        w.close("Gather");
    }
}

/// Reply to an incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: String,
    pub to: Option<String>,
    pub from: Option<String>,
    pub media_url: Option<String>,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            to: None,
            from: None,
            media_url: None,
        }
    }

    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    fn write(&self, w: &mut XmlWriter) {
        let attrs = [("to", self.to.clone()), ("from", self.from.clone())];
        match &self.media_url {
            None => w.element("Message", &attrs, &self.body),
            Some(url) => {
                w.open("Message", &attrs);
                w.element("Body", &[], &self.body);
                w.element("Media", &[], url);
                w.close("Message");
            }
        }
    }
}

/// A top-level TwiML instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Say(Say),
    Play(Play),
    Dial(Dial),
    Gather(Gather),
    Message(Message),
    /// Silence for the given number of seconds (Twilio's default is 1).
    Pause(Option<u32>),
    Redirect(String),
    Hangup,
}

/// A `<Response>` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    verbs: Vec<Verb>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verbs.push(verb);
        self
    }

    #[must_use]
    pub fn say(self, say: Say) -> Self {
        self.verb(Verb::Say(say))
    }

    #[must_use]
    pub fn play(self, play: Play) -> Self {
        self.verb(Verb::Play(play))
    }

    #[must_use]
    pub fn dial(self, dial: Dial) -> Self {
        self.verb(Verb::Dial(dial))
    }

    #[must_use]
    pub fn gather(self, gather: Gather) -> Self {
        self.verb(Verb::Gather(gather))
    }

    #[must_use]
    pub fn message(self, message: Message) -> Self {
        self.verb(Verb::Message(message))
    }

    #[must_use]
    pub fn pause(self, length: Option<u32>) -> Self {
        self.verb(Verb::Pause(length))
    }

    #[must_use]
    pub fn redirect(self, url: impl Into<String>) -> Self {
        self.verb(Verb::Redirect(url.into()))
    }

    #[must_use]
    pub fn hangup(self) -> Self {
        self.verb(Verb::Hangup)
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Render the document, XML declaration included.
    pub fn to_xml(&self) -> String {
        let mut w = XmlWriter::new();
        w.raw(XML_DECLARATION);
        if self.verbs.is_empty() {
            w.empty("Response", &[]);
            return w.finish();
        }
        w.open("Response", &[]);
        for verb in &self.verbs {
            match verb {
                Verb::Say(v) => v.write(&mut w),
                Verb::Play(v) => v.write(&mut w),
                Verb::Dial(v) => v.write(&mut w),
                Verb::Gather(v) => v.write(&mut w),
                Verb::Message(v) => v.write(&mut w),
                Verb::Pause(length) => write_pause(&mut w, *length),
                Verb::Redirect(url) => w.element("Redirect", &[], url),
                Verb::Hangup => w.empty("Hangup", &[]),
            }
        }
        w.close("Response");
        w.finish()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

fn write_pause(w: &mut XmlWriter, length: Option<u32>) {
    w.empty("Pause", &[("length", length.map(|n| n.to_string()))]);
}

type Attrs<'a> = [(&'a str, Option<String>)];

struct XmlWriter {
    out: String,
}

impl XmlWriter {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn raw(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn start_tag(&mut self, name: &str, attrs: &Attrs<'_>) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            if let Some(value) = value {
                self.out.push(' ');
                self.out.push_str(key);
                self.out.push_str("=\"");
                escape_into(&mut self.out, value);
                self.out.push('"');
            }
        }
    }

    fn open(&mut self, name: &str, attrs: &Attrs<'_>) {
        self.start_tag(name, attrs);
        self.out.push('>');
    }

    fn close(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn empty(&mut self, name: &str, attrs: &Attrs<'_>) {
        self.start_tag(name, attrs);
        self.out.push_str("/>");
    }

    fn element(&mut self, name: &str, attrs: &Attrs<'_>, text: &str) {
        self.open(name, attrs);
        escape_into(&mut self.out, text);
        self.close(name);
    }

    fn finish(self) -> String {
        self.out
    }
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
}

/// The `Char` production of XML 1.0. Anything else cannot appear in a
/// document, escaped or not, and is dropped.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
