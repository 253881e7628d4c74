/// Static terrain kinds of the city grid. Every kind except [Terrain::Building]
/// is traversable at an integer cost per step; buildings are impassable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Terrain {
    #[default]
    Road,
    Grass,
    Water,
    Mountain,
    Building,
}

impl Terrain {
    /// Traversal cost of the cell in unit terms, [None] for impassable terrain.
    /// Traversable costs are always at least 1.
    pub fn cost(self) -> Option<i32> {
        match self {
            Terrain::Road => Some(1),
            Terrain::Grass => Some(2),
            Terrain::Water => Some(4),
            Terrain::Mountain => Some(8),
            Terrain::Building => None,
        }
    }

    pub fn is_passable(self) -> bool {
        self.cost().is_some()
    }

    /// Single-character map symbol used by the ASCII renderer.
    pub fn symbol(self) -> char {
        match self {
            Terrain::Road => '.',
            Terrain::Grass => 'g',
            Terrain::Water => '~',
            Terrain::Mountain => '^',
            Terrain::Building => '#',
        }
    }
}
