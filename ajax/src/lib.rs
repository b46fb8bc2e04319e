//! Shared action vocabulary and `ajax-response` envelope codec.
//!
//! This crate owns the wire representation used by both the `chatroom`
//! server and the `client` crate. Requests are plain query parameters
//! (`?ajax=join&name=alice`); responses are a small XML envelope holding one
//! or more tagged `<response>` elements:
//!
//! ```xml
//! <ajax-response>
//! <response type="object" id="joined"><ok/></response>
//! <response type="object" id="event"><event from="bob" text="hi" alert="false"/></response>
//! </ajax-response>
//! ```
//!
//! Tags are decoded once, here, into [`Response`] so consumers match on
//! variants instead of strings.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// Query parameter naming the requested action.
pub const ACTION_PARAM: &str = "ajax";

/// Error returned by the envelope codec and action parsing.
#[derive(Debug, thiserror::Error)]
pub enum AjaxError {
    /// The payload is not well-formed XML.
    #[error("failed to decode ajax response: {0}")]
    Decode(String),
    /// Writing the envelope failed.
    #[error("failed to encode ajax response: {0}")]
    Encode(String),
    /// No `<ajax-response>` root element was found.
    #[error("missing <ajax-response> envelope")]
    MissingEnvelope,
    /// A response tag that requires a payload element arrived without one.
    #[error("response `{0}` is missing its payload")]
    MissingPayload(&'static str),
    /// The requested action name is not part of the vocabulary.
    #[error("No implementation for {0}")]
    UnknownAction(String),
}

// =============================================================================
// ACTIONS
// =============================================================================

/// A symbolic request sent from client to server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Join the room, or rename when already joined.
    Join { name: String },
    /// Leave the room.
    Leave,
    /// Post a line of chat text.
    Chat { text: String },
    /// Long-poll for the next event.
    GetEvents,
    /// Look up a roster entry.
    GetMember { member: String },
}

impl Action {
    /// Wire name carried in the [`ACTION_PARAM`] query parameter.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave => "leave",
            Self::Chat { .. } => "chat",
            Self::GetEvents => "getEvents",
            Self::GetMember { .. } => "getMember",
        }
    }

    /// Query parameters for this action, action name first.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![(ACTION_PARAM, self.name().to_owned())];
        match self {
            Self::Join { name } => query.push(("name", name.clone())),
            Self::Chat { text } => query.push(("text", text.clone())),
            Self::GetMember { member } => query.push(("member", member.clone())),
            Self::Leave | Self::GetEvents => {}
        }
        query
    }

    /// Rebuild an action from its wire name and the request's parameters.
    ///
    /// Missing parameters decode as empty strings; policy for empty values
    /// belongs to the handler.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::UnknownAction`] for names outside the vocabulary.
    pub fn from_params(method: &str, params: &[(String, String)]) -> Result<Self, AjaxError> {
        let param = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        match method {
            "join" => Ok(Self::Join { name: param("name") }),
            "leave" => Ok(Self::Leave),
            "chat" => Ok(Self::Chat { text: param("text") }),
            "getEvents" => Ok(Self::GetEvents),
            "getMember" => Ok(Self::GetMember { member: param("member") }),
            other => Err(AjaxError::UnknownAction(other.to_owned())),
        }
    }
}

/// Every action name requested in a parameter list, in request order.
pub fn requested_actions(params: &[(String, String)]) -> impl Iterator<Item = &str> {
    params
        .iter()
        .filter(|(k, _)| k == ACTION_PARAM)
        .map(|(_, v)| v.as_str())
}

// =============================================================================
// RESPONSES
// =============================================================================

/// A single chat line as delivered by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEvent {
    pub from: String,
    pub alert: bool,
    pub text: String,
}

/// Roster entry detail returned for `getMember`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    pub present: bool,
}

/// One decoded `<response>` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Membership confirmed (join or rename).
    Joined,
    /// Membership ended.
    Left,
    /// A chat event for the log.
    Event(ChatEvent),
    /// Long-poll keep-alive with no payload.
    PollAck,
    /// Current roster, in join order.
    Members(Vec<String>),
    /// Detail for one roster entry.
    Member(MemberInfo),
    /// Server-side error text.
    Error(String),
    /// A well-formed response with a tag this crate does not know.
    Unknown { kind: String, id: String },
}

impl Response {
    /// The `type` attribute: `object` or `element`.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Joined | Self::Left | Self::Event(_) | Self::PollAck | Self::Member(_) => "object",
            Self::Members(_) | Self::Error(_) => "element",
            Self::Unknown { kind, .. } => kind.as_str(),
        }
    }

    /// The `id` attribute, i.e. the response tag.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Joined => "joined",
            Self::Left => "left",
            Self::Event(_) => "event",
            Self::PollAck => "poll",
            Self::Members(_) => "members",
            Self::Member(_) => "member",
            Self::Error(_) => "error",
            Self::Unknown { id, .. } => id.as_str(),
        }
    }
}

// =============================================================================
// ENCODE
// =============================================================================

/// Encode responses into an `ajax-response` document.
///
/// # Errors
///
/// Returns [`AjaxError::Encode`] if the XML writer fails.
pub fn encode_envelope(responses: &[Response]) -> Result<String, AjaxError> {
    let mut writer = Writer::new(Vec::new());
    write(&mut writer, Event::Start(BytesStart::new("ajax-response")))?;
    for response in responses {
        write(&mut writer, Event::Text(BytesText::new("\n")))?;
        write_response(&mut writer, response)?;
    }
    write(&mut writer, Event::Text(BytesText::new("\n")))?;
    write(&mut writer, Event::End(BytesEnd::new("ajax-response")))?;
    String::from_utf8(writer.into_inner()).map_err(|e| AjaxError::Encode(e.to_string()))
}

fn write_response(writer: &mut Writer<Vec<u8>>, response: &Response) -> Result<(), AjaxError> {
    let open = BytesStart::new("response").with_attributes([("type", response.kind()), ("id", response.id())]);
    write(writer, Event::Start(open))?;

    match response {
        Response::Joined => write(writer, Event::Empty(BytesStart::new("ok")))?,
        Response::Event(event) => {
            let alert = if event.alert { "true" } else { "false" };
            let payload = BytesStart::new("event").with_attributes([
                ("from", event.from.as_str()),
                ("text", event.text.as_str()),
                ("alert", alert),
            ]);
            write(writer, Event::Empty(payload))?;
        }
        Response::Members(names) => {
            write(writer, Event::Start(BytesStart::new("ul")))?;
            for name in names {
                write(writer, Event::Start(BytesStart::new("li")))?;
                write(writer, Event::Text(BytesText::new(name)))?;
                write(writer, Event::End(BytesEnd::new("li")))?;
            }
            write(writer, Event::End(BytesEnd::new("ul")))?;
        }
        Response::Member(member) => {
            let present = if member.present { "true" } else { "false" };
            let payload =
                BytesStart::new("member").with_attributes([("name", member.name.as_str()), ("present", present)]);
            write(writer, Event::Empty(payload))?;
        }
        Response::Error(message) => {
            write(writer, Event::Start(BytesStart::new("span").with_attributes([("class", "error")])))?;
            write(writer, Event::Text(BytesText::new(message)))?;
            write(writer, Event::End(BytesEnd::new("span")))?;
        }
        Response::Left | Response::PollAck | Response::Unknown { .. } => {}
    }

    write(writer, Event::End(BytesEnd::new("response")))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), AjaxError> {
    writer
        .write_event(event)
        .map_err(|e| AjaxError::Encode(e.to_string()))
}

// =============================================================================
// DECODE
// =============================================================================

/// Decode an `ajax-response` document into its responses, in document order.
///
/// # Errors
///
/// Returns [`AjaxError::Decode`] for malformed XML, [`AjaxError::MissingEnvelope`]
/// when there is no `<ajax-response>` root, and [`AjaxError::MissingPayload`]
/// when an `event` or `member` response carries no payload element.
pub fn decode_envelope(xml: &str) -> Result<Vec<Response>, AjaxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut decoder = Decoder::default();

    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(start) => decoder.open(&start, false)?,
            Event::Empty(start) => decoder.open(&start, true)?,
            Event::Text(text) => decoder.text(&text.unescape().map_err(decode_error)?),
            Event::End(end) => decoder.close(end.name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
    }

    decoder.finish()
}

fn decode_error(err: impl std::fmt::Display) -> AjaxError {
    AjaxError::Decode(err.to_string())
}

#[derive(Default)]
struct Decoder {
    saw_envelope: bool,
    pending: Option<PendingResponse>,
    decoded: Vec<Response>,
}

impl Decoder {
    fn open(&mut self, start: &BytesStart<'_>, self_closing: bool) -> Result<(), AjaxError> {
        match start.name().as_ref() {
            b"ajax-response" => self.saw_envelope = true,
            b"response" => {
                let attrs = attributes(start)?;
                self.pending = Some(PendingResponse {
                    kind: attr(&attrs, "type").unwrap_or_default().to_owned(),
                    id: attr(&attrs, "id").unwrap_or("unknown").to_owned(),
                    ..PendingResponse::default()
                });
                if self_closing {
                    self.close(b"response")?;
                }
            }
            b"event" => {
                if let Some(pending) = self.pending.as_mut() {
                    let attrs = attributes(start)?;
                    pending.event = Some(ChatEvent {
                        from: attr(&attrs, "from").unwrap_or_default().to_owned(),
                        alert: attr(&attrs, "alert") == Some("true"),
                        text: attr(&attrs, "text").unwrap_or_default().to_owned(),
                    });
                }
            }
            b"member" => {
                if let Some(pending) = self.pending.as_mut() {
                    let attrs = attributes(start)?;
                    pending.member = Some(MemberInfo {
                        name: attr(&attrs, "name").unwrap_or_default().to_owned(),
                        present: attr(&attrs, "present") == Some("true"),
                    });
                }
            }
            b"li" => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.item = Some(String::new());
                    if self_closing {
                        pending.close_item();
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(pending) = self.pending.as_mut() {
            match pending.item.as_mut() {
                Some(item) => item.push_str(text),
                None => pending.text.push_str(text),
            }
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<(), AjaxError> {
        match name {
            b"li" => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.close_item();
                }
            }
            b"response" => {
                if let Some(pending) = self.pending.take() {
                    self.decoded.push(pending.into_response()?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<Response>, AjaxError> {
        if !self.saw_envelope {
            return Err(AjaxError::MissingEnvelope);
        }
        Ok(self.decoded)
    }
}

#[derive(Default)]
struct PendingResponse {
    kind: String,
    id: String,
    event: Option<ChatEvent>,
    member: Option<MemberInfo>,
    items: Vec<String>,
    item: Option<String>,
    text: String,
}

impl PendingResponse {
    fn close_item(&mut self) {
        if let Some(item) = self.item.take() {
            self.items.push(item.trim().to_owned());
        }
    }

    fn into_response(self) -> Result<Response, AjaxError> {
        match (self.kind.as_str(), self.id.as_str()) {
            ("object", "joined") => Ok(Response::Joined),
            ("object", "left") => Ok(Response::Left),
            ("object", "poll") => Ok(Response::PollAck),
            ("object", "event") => self.event.map(Response::Event).ok_or(AjaxError::MissingPayload("event")),
            ("object", "member") => self.member.map(Response::Member).ok_or(AjaxError::MissingPayload("member")),
            ("element", "members") => Ok(Response::Members(self.items)),
            ("element", "error") => Ok(Response::Error(self.text.trim().to_owned())),
            _ => Ok(Response::Unknown { kind: self.kind.clone(), id: self.id.clone() }),
        }
    }
}

fn attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>, AjaxError> {
    start
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(decode_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(decode_error)?.into_owned();
            Ok((key, value))
        })
        .collect()
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
