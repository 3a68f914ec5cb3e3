use segment::{Delimiters, IsaHeader, RawSegment, Segment};

/// How [`TransactionSet::find_segment`] picks among segments sharing an ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentLookup {
    /// First segment with the ID
    #[default]
    First,
    /// Segment with the ID at this 1-based position in the transaction set
    Position(usize),
    /// The nth (1-based) segment with the ID
    Occurrence(usize),
}

/// An ST...SE transaction set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSet {
    pub(crate) control_number: String,
    pub(crate) document_type: String,
    pub(crate) segments: Vec<Segment>,
    pub(crate) segment_count: usize,
}

impl TransactionSet {
    /// Start a transaction set from its ST segment
    pub(crate) fn open(raw: &RawSegment<'_>) -> Self {
        let header = Segment::new(raw, 1);
        Self {
            control_number: header.element(2).unwrap_or_default().to_owned(),
            document_type: header.element(1).unwrap_or_default().to_owned(),
            segments: vec![header],
            segment_count: 1,
        }
    }

    /// Append a segment at the next position
    pub(crate) fn push(&mut self, raw: &RawSegment<'_>) {
        self.segment_count += 1;
        self.segments.push(Segment::new(raw, self.segment_count));
    }

    /// ST-02
    pub fn control_number(&self) -> &str {
        &self.control_number
    }

    /// ST-01, e.g. "837" or "270"
    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// All segments, ST through SE
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// First segment with the given ID
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.find_segment(id, SegmentLookup::First)
    }

    pub fn find_segment(&self, id: &str, lookup: SegmentLookup) -> Option<&Segment> {
        let mut matching = self.segments.iter().filter(|segment| segment.id() == id);
        match lookup {
            SegmentLookup::First => matching.next(),
            SegmentLookup::Position(position) => {
                matching.find(|segment| segment.position() == position)
            }
            SegmentLookup::Occurrence(0) => None,
            SegmentLookup::Occurrence(n) => matching.nth(n - 1),
        }
    }

    /// All segments with the given ID, in document order
    pub fn segments_with_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |segment| segment.id() == id)
    }
}

/// A GS...GE functional group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalGroup {
    pub(crate) control_number: String,
    pub(crate) sender_id: String,
    pub(crate) receiver_id: String,
    pub(crate) date: String,
    pub(crate) time: String,
    pub(crate) version: String,
    pub(crate) transaction_sets: Vec<TransactionSet>,
    pub(crate) header: Segment,
    pub(crate) trailer: Option<Segment>,
}

impl FunctionalGroup {
    /// Start a functional group from its GS segment
    pub(crate) fn open(raw: &RawSegment<'_>) -> Self {
        let header = Segment::new(raw, 1);
        let field = |number| header.element(number).unwrap_or_default().to_owned();

        Self {
            control_number: field(6),
            sender_id: field(2),
            receiver_id: field(3),
            date: field(4),
            time: field(5),
            version: field(8),
            transaction_sets: Vec::new(),
            trailer: None,
            header,
        }
    }

    /// GS-06
    pub fn control_number(&self) -> &str {
        &self.control_number
    }

    /// GS-02, without qualifier
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// GS-03, without qualifier
    pub fn receiver_id(&self) -> &str {
        &self.receiver_id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// GS-08
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn transaction_sets(&self) -> &[TransactionSet] {
        &self.transaction_sets
    }

    /// The GS segment
    pub fn header(&self) -> &Segment {
        &self.header
    }

    /// The GE segment; always present once the group is closed
    pub fn trailer(&self) -> Option<&Segment> {
        self.trailer.as_ref()
    }
}

/// An ISA...IEA interchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interchange {
    pub(crate) control_number: String,
    pub(crate) sender_id: String,
    pub(crate) receiver_id: String,
    pub(crate) date: String,
    pub(crate) time: String,
    pub(crate) version: String,
    pub(crate) delimiters: Delimiters,
    pub(crate) functional_groups: Vec<FunctionalGroup>,
    pub(crate) header: Segment,
    pub(crate) trailer: Option<Segment>,
}

impl Interchange {
    /// Start an interchange from an ISA segment with the full 17 elements
    pub(crate) fn open(raw: &RawSegment<'_>, delimiters: Delimiters) -> Self {
        let isa = IsaHeader::new(raw);

        Self {
            control_number: isa.control_number().to_owned(),
            sender_id: isa.sender_qualifier().qualify(isa.sender_id()),
            receiver_id: isa.receiver_qualifier().qualify(isa.receiver_id()),
            date: isa.date().to_owned(),
            time: isa.time().to_owned(),
            version: isa.version().to_owned(),
            delimiters,
            functional_groups: Vec::new(),
            header: Segment::new(raw, 1),
            trailer: None,
        }
    }

    /// ISA-13
    pub fn control_number(&self) -> &str {
        &self.control_number
    }

    /// ISA-06, prefixed with its ISA-05 qualifier as `QUALIFIER:ID`
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// ISA-08, prefixed with its ISA-07 qualifier as `QUALIFIER:ID`
    pub fn receiver_id(&self) -> &str {
        &self.receiver_id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// ISA-12
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    pub fn element_separator(&self) -> char {
        self.delimiters.element
    }

    pub fn component_separator(&self) -> char {
        self.delimiters.subelement
    }

    pub fn segment_terminator(&self) -> char {
        self.delimiters.segment
    }

    pub fn functional_groups(&self) -> &[FunctionalGroup] {
        &self.functional_groups
    }

    /// The ISA segment
    pub fn header(&self) -> &Segment {
        &self.header
    }

    /// The IEA segment; always present once the interchange is closed
    pub fn trailer(&self) -> Option<&Segment> {
        self.trailer.as_ref()
    }

    /// Transaction sets across all functional groups, in document order
    pub fn transaction_sets(&self) -> impl Iterator<Item = &TransactionSet> {
        self.functional_groups
            .iter()
            .flat_map(|group| group.transaction_sets.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn claim() -> TransactionSet {
        let mut set = TransactionSet::open(&RawSegment::split("ST*837*0001", '*'));
        for text in [
            "BHT*0019*00*0123*20210101*1200*CH",
            "NM1*41*2*SUBMITTER",
            "NM1*40*2*RECEIVER",
            "HL*1**20*1",
            "NM1*85*2*BILLING",
            "SE*7*0001",
        ] {
            set.push(&RawSegment::split(text, '*'));
        }
        set
    }

    #[test]
    fn test_open_reads_st_fields() {
        let set = claim();
        assert_eq!(set.document_type(), "837");
        assert_eq!(set.control_number(), "0001");
        assert_eq!(set.segment_count(), 7);
        assert_eq!(set.segments().len(), 7);
    }

    #[test]
    fn test_segment_positions_count_from_st() {
        let set = claim();
        let positions: Vec<_> = set.segments().iter().map(Segment::position).collect();
        assert_eq!(positions, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_segment_lookup() {
        let set = claim();

        assert_eq!(set.segment("NM1").unwrap().element(1), Some("41"));
        assert_eq!(
            set.find_segment("NM1", SegmentLookup::Occurrence(3))
                .unwrap()
                .element(1),
            Some("85")
        );
        assert_eq!(
            set.find_segment("NM1", SegmentLookup::Position(4))
                .unwrap()
                .element(1),
            Some("40")
        );
        assert!(set.find_segment("NM1", SegmentLookup::Position(5)).is_none());
        assert!(set.find_segment("NM1", SegmentLookup::Occurrence(0)).is_none());
        assert!(set.find_segment("NM1", SegmentLookup::Occurrence(4)).is_none());
        assert!(set.segment("CLM").is_none());
        assert_eq!(set.segments_with_id("NM1").count(), 3);
    }

    #[test]
    fn test_lookup_result_outlives_id() {
        let set = claim();
        let found = {
            let id = String::from("NM1");
            set.find_segment(&id, SegmentLookup::Occurrence(2))
        };
        assert_eq!(found.map(Segment::position), Some(4));

        let first = {
            let id = "HL".to_owned();
            set.segment(&id)
        };
        assert_eq!(first.and_then(|segment| segment.element(1)), Some("1"));
    }

    #[test]
    fn test_group_header_fields() {
        let group = FunctionalGroup::open(&RawSegment::split(
            "GS*HC*SENDER*RECEIVER*20210101*1200*17*X*005010X222A1",
            '*',
        ));
        assert_eq!(group.control_number(), "17");
        assert_eq!(group.sender_id(), "SENDER");
        assert_eq!(group.receiver_id(), "RECEIVER");
        assert_eq!(group.date(), "20210101");
        assert_eq!(group.time(), "1200");
        assert_eq!(group.version(), "005010X222A1");
        assert_eq!(group.header().position(), 1);
        assert!(group.trailer().is_none());
    }

    #[test]
    fn test_interchange_ids_are_qualified() {
        let raw = RawSegment::split(
            "ISA*00*          *00*          *ZZ*SENDER         *  *RECEIVER       *210101*1200*^*00501*000000001*0*P*:",
            '*',
        );
        let interchange = Interchange::open(&raw, Delimiters::default());
        assert_eq!(interchange.sender_id(), "ZZ:SENDER");
        assert_eq!(interchange.receiver_id(), "RECEIVER");
        assert_eq!(interchange.control_number(), "000000001");
        assert_eq!(interchange.version(), "00501");
        assert_eq!(interchange.segment_terminator(), '~');
        assert_eq!(interchange.header().element(16), Some(":"));
    }
}
