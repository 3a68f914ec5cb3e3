//! Close-time checks: declared counts and control numbers

use segment::{RawSegment, Segment};

use crate::model::{FunctionalGroup, Interchange, TransactionSet};
use crate::{EnvelopeError, EnvelopeLevel};

/// Count declared in element 1 of a trailer segment
fn declared_count(level: EnvelopeLevel, trailer: &Segment) -> Result<usize, EnvelopeError> {
    let value = trailer.element(1).unwrap_or_default();
    value.parse().map_err(|_| EnvelopeError::InvalidCount {
        level,
        value: value.to_owned(),
    })
}

fn check_count(level: EnvelopeLevel, declared: usize, actual: usize) -> Result<(), EnvelopeError> {
    if declared != actual {
        return Err(EnvelopeError::CountMismatch {
            level,
            declared,
            actual,
        });
    }
    Ok(())
}

/// Control number in element 2 of a trailer must match the header's
fn check_control_number(
    level: EnvelopeLevel,
    header: &str,
    trailer: &Segment,
) -> Result<(), EnvelopeError> {
    let trailer = trailer.element(2).unwrap_or_default();
    if trailer != header {
        return Err(EnvelopeError::ControlNumberMismatch {
            level,
            header: header.to_owned(),
            trailer: trailer.to_owned(),
        });
    }
    Ok(())
}

impl TransactionSet {
    /// Append the SE segment and validate the completed set
    pub(crate) fn close(mut self, raw: &RawSegment<'_>) -> Result<Self, EnvelopeError> {
        self.push(raw);

        if let Some(trailer) = self.segments.last() {
            check_control_number(EnvelopeLevel::TransactionSet, &self.control_number, trailer)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check that SE-01 matches the number of segments
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        let level = EnvelopeLevel::TransactionSet;

        // ST seeds the list on open and SE is appended on close
        debug_assert_eq!(self.segments.first().map(Segment::id), Some(level.header_id()));
        debug_assert_eq!(self.segments.last().map(Segment::id), Some(level.trailer_id()));

        let declared = self
            .segments
            .last()
            .map_or(Ok(0), |trailer| declared_count(level, trailer))?;
        check_count(level, declared, self.segments.len())
    }
}

impl FunctionalGroup {
    /// Attach the GE segment and validate the completed group
    pub(crate) fn close(mut self, raw: &RawSegment<'_>) -> Result<Self, EnvelopeError> {
        let level = EnvelopeLevel::FunctionalGroup;
        let trailer = Segment::new(raw, 2);

        check_count(
            level,
            declared_count(level, &trailer)?,
            self.transaction_sets.len(),
        )?;
        check_control_number(level, &self.control_number, &trailer)?;

        self.trailer = Some(trailer);
        self.validate()?;
        Ok(self)
    }

    /// Check that the group holds at least one transaction set and, once
    /// closed, that GE-01 matches their number
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        let level = EnvelopeLevel::FunctionalGroup;

        if self.transaction_sets.is_empty() {
            return Err(EnvelopeError::EmptyEnvelope { level });
        }

        if let Some(trailer) = &self.trailer {
            check_count(
                level,
                declared_count(level, trailer)?,
                self.transaction_sets.len(),
            )?;
        }

        Ok(())
    }
}

impl Interchange {
    /// Attach the IEA segment and validate the completed interchange
    pub(crate) fn close(mut self, raw: &RawSegment<'_>) -> Result<Self, EnvelopeError> {
        let trailer = Segment::new(raw, 2);
        check_control_number(EnvelopeLevel::Interchange, &self.control_number, &trailer)?;

        self.trailer = Some(trailer);
        self.validate()?;
        Ok(self)
    }

    /// Check that the interchange holds at least one functional group and,
    /// once closed, that IEA-01 matches their number
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        let level = EnvelopeLevel::Interchange;

        if self.functional_groups.is_empty() {
            return Err(EnvelopeError::EmptyEnvelope { level });
        }

        if let Some(trailer) = &self.trailer {
            check_count(
                level,
                declared_count(level, trailer)?,
                self.functional_groups.len(),
            )?;
        }

        Ok(())
    }
}
