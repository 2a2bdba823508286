use kernel::id::Id;

pub struct EmailMarker;

/// Identifier of a row in the email outbox
pub type EmailId = Id<EmailMarker>;
