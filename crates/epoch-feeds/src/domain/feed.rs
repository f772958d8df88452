//! # Feed Identity
//!
//! A feed is the pair (producer, topic). An update inside a feed is further
//! pinned to one epoch; that triple is the [`UpdateId`] whose hash is the
//! chunk address.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::epoch::{Epoch, EPOCH_LENGTH};
use super::errors::CodecError;
use super::value_objects::{Topic, User, TOPIC_LENGTH, USER_LENGTH};

/// Serialized size of an [`UpdateId`].
pub const ID_LENGTH: usize = USER_LENGTH + TOPIC_LENGTH + EPOCH_LENGTH;

/// A single versioned stream of updates.
///
/// Two updates belong to the same feed iff both fields are byte-equal.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feed {
    /// Producer identity.
    pub user: User,
    /// Stream topic.
    pub topic: Topic,
}

impl Feed {
    /// Create a feed identity.
    pub fn new(user: User, topic: Topic) -> Self {
        Self { user, topic }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.topic, self.user)
    }
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Feed({})", self)
    }
}

/// Position of one update: feed plus epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UpdateId {
    /// Owning feed.
    pub feed: Feed,
    /// Epoch the update occupies.
    pub epoch: Epoch,
}

impl UpdateId {
    /// Create an update ID.
    pub fn new(feed: Feed, epoch: Epoch) -> Self {
        Self { feed, epoch }
    }

    /// `User || Topic || Epoch`: the preimage of the chunk address.
    pub fn to_bytes(&self) -> [u8; ID_LENGTH] {
        let mut out = [0u8; ID_LENGTH];
        out[..USER_LENGTH].copy_from_slice(self.feed.user.as_bytes());
        out[USER_LENGTH..USER_LENGTH + TOPIC_LENGTH].copy_from_slice(self.feed.topic.as_bytes());
        out[USER_LENGTH + TOPIC_LENGTH..].copy_from_slice(&self.epoch.to_bytes());
        out
    }

    /// Inverse of [`UpdateId::to_bytes`].
    pub fn from_bytes(bytes: &[u8; ID_LENGTH]) -> Result<Self, CodecError> {
        let mut user = [0u8; USER_LENGTH];
        user.copy_from_slice(&bytes[..USER_LENGTH]);
        let mut topic = [0u8; TOPIC_LENGTH];
        topic.copy_from_slice(&bytes[USER_LENGTH..USER_LENGTH + TOPIC_LENGTH]);
        let mut epoch = [0u8; EPOCH_LENGTH];
        epoch.copy_from_slice(&bytes[USER_LENGTH + TOPIC_LENGTH..]);

        Ok(Self {
            feed: Feed::new(User(user), Topic(topic)),
            epoch: Epoch::from_bytes(&epoch)?,
        })
    }
}
