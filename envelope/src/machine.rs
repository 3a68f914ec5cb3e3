use std::mem;

use segment::{Delimiters, RawSegment, SegmentHandler};
use tracing::{debug, trace};

use crate::model::{FunctionalGroup, Interchange, TransactionSet};
use crate::{EnvelopeError, EnvelopeLevel, SegmentKind};

/// Envelopes currently open, outermost first
///
/// Each variant owns exactly the entities open at that depth; closing an
/// envelope moves it into its parent.
#[derive(Debug, Default)]
enum State {
    #[default]
    NoOpenInterchange,
    AwaitingFunctionalGroup {
        interchange: Interchange,
    },
    AwaitingTransactionSet {
        interchange: Interchange,
        group: FunctionalGroup,
    },
    InTransactionSet {
        interchange: Interchange,
        group: FunctionalGroup,
        set: TransactionSet,
    },
}

impl State {
    /// Innermost open level, if any
    fn innermost(&self) -> Option<EnvelopeLevel> {
        match self {
            Self::NoOpenInterchange => None,
            Self::AwaitingFunctionalGroup { .. } => Some(EnvelopeLevel::Interchange),
            Self::AwaitingTransactionSet { .. } => Some(EnvelopeLevel::FunctionalGroup),
            Self::InTransactionSet { .. } => Some(EnvelopeLevel::TransactionSet),
        }
    }
}

/// Envelope state machine
///
/// Dispatches each segment by its [`SegmentKind`], opening, filling and
/// closing envelopes. Every error is fatal: after one, the machine is
/// discarded and a new one built for the next document.
#[derive(Debug)]
pub struct EnvelopeMachine {
    delimiters: Delimiters,
    state: State,
    interchanges: Vec<Interchange>,
}

impl EnvelopeMachine {
    /// Create a machine for a document using `delimiters`
    pub fn new(delimiters: Delimiters) -> Self {
        Self {
            delimiters,
            state: State::NoOpenInterchange,
            interchanges: Vec::new(),
        }
    }

    /// Level of the innermost envelope still open
    pub fn open_level(&self) -> Option<EnvelopeLevel> {
        self.state.innermost()
    }

    /// End of input: every envelope must be closed
    pub fn finish(self) -> Result<Vec<Interchange>, EnvelopeError> {
        match self.state.innermost() {
            Some(level) => Err(EnvelopeError::UnclosedEnvelope { level }),
            None => Ok(self.interchanges),
        }
    }

    fn open_interchange(&mut self, segment: &RawSegment<'_>) -> Result<(), EnvelopeError> {
        if !matches!(self.state, State::NoOpenInterchange) {
            return Err(EnvelopeError::NestedOpeningEnvelope {
                level: EnvelopeLevel::Interchange,
            });
        }

        let interchange = Interchange::open(segment, self.delimiters);
        debug!(
            control_number = interchange.control_number(),
            sender = interchange.sender_id(),
            receiver = interchange.receiver_id(),
            "opened interchange"
        );
        self.state = State::AwaitingFunctionalGroup { interchange };
        Ok(())
    }

    fn close_interchange(&mut self, segment: &RawSegment<'_>) -> Result<(), EnvelopeError> {
        let interchange = match mem::take(&mut self.state) {
            State::AwaitingFunctionalGroup { interchange } => interchange,
            State::NoOpenInterchange => {
                return Err(EnvelopeError::NoMatchingOpen {
                    level: EnvelopeLevel::Interchange,
                })
            }
            open => return Err(self.still_open(open)),
        };

        let interchange = interchange.close(segment)?;
        debug!(
            control_number = interchange.control_number(),
            groups = interchange.functional_groups().len(),
            "closed interchange"
        );
        self.interchanges.push(interchange);
        Ok(())
    }

    fn open_group(&mut self, segment: &RawSegment<'_>) -> Result<(), EnvelopeError> {
        match mem::take(&mut self.state) {
            State::AwaitingFunctionalGroup { interchange } => {
                let group = FunctionalGroup::open(segment);
                trace!(control_number = group.control_number(), "opened functional group");
                self.state = State::AwaitingTransactionSet { interchange, group };
                Ok(())
            }
            // A new GS ends the current group without a GE
            State::AwaitingTransactionSet {
                mut interchange,
                group,
            } => {
                if let Err(err) = group.validate() {
                    self.state = State::AwaitingTransactionSet { interchange, group };
                    return Err(err);
                }
                debug!(
                    control_number = group.control_number(),
                    transaction_sets = group.transaction_sets().len(),
                    "functional group ended without GE"
                );
                interchange.functional_groups.push(group);

                let group = FunctionalGroup::open(segment);
                trace!(control_number = group.control_number(), "opened functional group");
                self.state = State::AwaitingTransactionSet { interchange, group };
                Ok(())
            }
            State::NoOpenInterchange => Err(EnvelopeError::OutsideInterchange),
            open @ State::InTransactionSet { .. } => Err(self.still_open(open)),
        }
    }

    fn close_group(&mut self, segment: &RawSegment<'_>) -> Result<(), EnvelopeError> {
        match mem::take(&mut self.state) {
            State::AwaitingTransactionSet {
                mut interchange,
                group,
            } => {
                let group = group.close(segment)?;
                debug!(
                    control_number = group.control_number(),
                    transaction_sets = group.transaction_sets().len(),
                    "closed functional group"
                );
                interchange.functional_groups.push(group);
                self.state = State::AwaitingFunctionalGroup { interchange };
                Ok(())
            }
            open @ State::InTransactionSet { .. } => Err(self.still_open(open)),
            open => {
                self.state = open;
                Err(EnvelopeError::NoMatchingOpen {
                    level: EnvelopeLevel::FunctionalGroup,
                })
            }
        }
    }

    fn open_transaction_set(&mut self, segment: &RawSegment<'_>) -> Result<(), EnvelopeError> {
        match mem::take(&mut self.state) {
            State::AwaitingTransactionSet { interchange, group } => {
                let set = TransactionSet::open(segment);
                trace!(
                    control_number = set.control_number(),
                    document_type = set.document_type(),
                    "opened transaction set"
                );
                self.state = State::InTransactionSet {
                    interchange,
                    group,
                    set,
                };
                Ok(())
            }
            open @ State::InTransactionSet { .. } => {
                self.state = open;
                Err(EnvelopeError::NestedOpeningEnvelope {
                    level: EnvelopeLevel::TransactionSet,
                })
            }
            open => {
                self.state = open;
                Err(EnvelopeError::OutsideFunctionalGroup)
            }
        }
    }

    fn close_transaction_set(&mut self, segment: &RawSegment<'_>) -> Result<(), EnvelopeError> {
        match mem::take(&mut self.state) {
            State::InTransactionSet {
                interchange,
                mut group,
                set,
            } => {
                let set = set.close(segment)?;
                trace!(
                    control_number = set.control_number(),
                    segments = set.segment_count(),
                    "closed transaction set"
                );
                group.transaction_sets.push(set);
                self.state = State::AwaitingTransactionSet { interchange, group };
                Ok(())
            }
            open => {
                self.state = open;
                Err(EnvelopeError::NoMatchingOpen {
                    level: EnvelopeLevel::TransactionSet,
                })
            }
        }
    }

    fn push_data(&mut self, segment: &RawSegment<'_>) -> Result<(), EnvelopeError> {
        match &mut self.state {
            State::InTransactionSet { set, .. } => {
                set.push(segment);
                Ok(())
            }
            State::NoOpenInterchange => Err(EnvelopeError::UnexpectedSegment {
                segment: segment.id().to_owned(),
            }),
            _ => Err(EnvelopeError::OutsideTransactionSet {
                segment: segment.id().to_owned(),
            }),
        }
    }

    /// Put `open` back and report its innermost level as unclosed
    fn still_open(&mut self, open: State) -> EnvelopeError {
        let error = match open.innermost() {
            Some(level) => EnvelopeError::UnclosedEnvelope { level },
            None => EnvelopeError::NoMatchingOpen {
                level: EnvelopeLevel::Interchange,
            },
        };
        self.state = open;
        error
    }
}

impl SegmentHandler for EnvelopeMachine {
    type Error = EnvelopeError;

    fn handle(&mut self, segment: &RawSegment<'_>) -> Result<(), Self::Error> {
        let kind = SegmentKind::from_id(segment.id());
        trace!(segment = segment.id(), ?kind, "dispatching segment");

        if let Some(expected) = kind.element_count() {
            if segment.element_count() != expected {
                return Err(EnvelopeError::WrongElementCount {
                    segment: segment.id().to_owned(),
                    expected: expected - 1,
                    found: segment.element_count() - 1,
                });
            }
        }

        match kind {
            SegmentKind::InterchangeHeader => self.open_interchange(segment),
            SegmentKind::InterchangeTrailer => self.close_interchange(segment),
            SegmentKind::GroupHeader => self.open_group(segment),
            SegmentKind::GroupTrailer => self.close_group(segment),
            SegmentKind::TransactionHeader => self.open_transaction_set(segment),
            SegmentKind::TransactionTrailer => self.close_transaction_set(segment),
            SegmentKind::Data => self.push_data(segment),
        }
    }
}
