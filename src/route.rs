use crate::core::{Coordinates, Direction, Instruction};

/// Маршрутний лист: курсор по впорядкованому списку команд.
///
/// Команди споживаються від початку до кінця й не повторюються;
/// почати наново можна лише призначивши новий лист.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteBook {
    instructions: Vec<Instruction>,
    cursor: usize,
}

impl RouteBook {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            cursor: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.instructions.len()
    }

    /// Повертає наступну команду й просуває курсор.
    pub fn next_instruction(&mut self) -> Option<Instruction> {
        let instruction = self.instructions.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(instruction)
    }

    pub fn remaining(&self) -> usize {
        self.instructions.len() - self.cursor
    }
}

impl From<Vec<Instruction>> for RouteBook {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}

/// Перетворює пару старт/ціль на послідовність команд.
pub trait RouteSynthesizer: Send + Sync {
    fn synthesize(&self, heading: Direction, from: Coordinates, to: Coordinates)
        -> Vec<Instruction>;
}

/// Спершу вирівнює X, потім Y, щоразу повертаючи найкоротшим шляхом.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRouteSynthesizer;

impl GreedyRouteSynthesizer {
    fn turns(heading: Direction, target: Direction) -> &'static [Instruction] {
        if heading == target {
            &[]
        } else if heading.clockwise() == target {
            &[Instruction::TurnRight]
        } else if heading.counterclockwise() == target {
            &[Instruction::TurnLeft]
        } else {
            &[Instruction::TurnRight, Instruction::TurnRight]
        }
    }
}

/// Різниця координат у `i64`, щоб не переповнити `i32` на далеких точках.
fn span(from: i32, to: i32) -> i64 {
    i64::from(to) - i64::from(from)
}

impl RouteSynthesizer for GreedyRouteSynthesizer {
    fn synthesize(
        &self,
        heading: Direction,
        from: Coordinates,
        to: Coordinates,
    ) -> Vec<Instruction> {
        let mut route = Vec::new();
        let mut heading = heading;

        let legs = [
            (span(from.x, to.x), Direction::East, Direction::West),
            (span(from.y, to.y), Direction::North, Direction::South),
        ];
        for (delta, positive, negative) in legs {
            if delta == 0 {
                continue;
            }
            let target = if delta > 0 { positive } else { negative };
            route.extend_from_slice(Self::turns(heading, target));
            heading = target;
            route.extend(std::iter::repeat_n(
                Instruction::Forward,
                delta.unsigned_abs() as usize,
            ));
        }
        route
    }
}
