use super::{BoundingBox, Codeword};

const MAX_NEARBY_DISTANCE: usize = 5;

/// Codewords of one symbol column, one slot per image row of the box
#[derive(Debug, Clone)]
pub struct DetectionResultColumn {
    bounding_box: BoundingBox,
    codewords: Vec<Option<Codeword>>,
}

impl DetectionResultColumn {
    pub fn new(bounding_box: BoundingBox) -> Self {
        let rows = bounding_box.max_y().saturating_sub(bounding_box.min_y()) + 1;
        Self {
            bounding_box,
            codewords: vec![None; rows],
        }
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Slot index of an image row
    pub fn image_row_to_codeword_index(&self, image_row: usize) -> Option<usize> {
        image_row
            .checked_sub(self.bounding_box.min_y())
            .filter(|&index| index < self.codewords.len())
    }

    pub fn set_codeword(&mut self, image_row: usize, codeword: Codeword) {
        if let Some(index) = self.image_row_to_codeword_index(image_row) {
            self.codewords[index] = Some(codeword);
        }
    }

    pub fn codeword(&self, image_row: usize) -> Option<Codeword> {
        self.image_row_to_codeword_index(image_row)
            .and_then(|index| self.codewords[index])
    }

    /// Codeword on `image_row`, or the closest one within a few rows above
    /// or below (above wins ties)
    pub fn codeword_nearby(&self, image_row: usize) -> Option<Codeword> {
        if let Some(codeword) = self.codeword(image_row) {
            return Some(codeword);
        }
        let index = image_row as i64 - self.bounding_box.min_y() as i64;
        for distance in 1..MAX_NEARBY_DISTANCE as i64 {
            for near in [index - distance, index + distance] {
                if near >= 0 {
                    if let Some(Some(codeword)) = self.codewords.get(near as usize) {
                        return Some(*codeword);
                    }
                }
            }
        }
        None
    }

    pub fn codewords(&self) -> &[Option<Codeword>] {
        &self.codewords
    }

    pub fn codewords_mut(&mut self) -> &mut [Option<Codeword>] {
        &mut self.codewords
    }

    /// Number of rows holding a codeword
    pub fn detected_count(&self) -> usize {
        self.codewords.iter().filter(|c| c.is_some()).count()
    }
}
