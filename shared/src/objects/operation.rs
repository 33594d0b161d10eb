use crate::objects::entity_data::EntityData;

/// Class of an operation. Operation classes the view layer reacts to have
/// their own variant, any other class keeps its type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Sight,
    Sound,
    Appearance,
    Disappearance,
    Unseen,
    Set,
    Create,
    Delete,
    Logout,
    Hit,
    Look,
    Talk,
    Imaginary,
    Move,
    Touch,
    Use,
    Other(String),
}

impl OperationKind {
    pub fn type_name(&self) -> &str {
        match self {
            OperationKind::Sight => "sight",
            OperationKind::Sound => "sound",
            OperationKind::Appearance => "appearance",
            OperationKind::Disappearance => "disappearance",
            OperationKind::Unseen => "unseen",
            OperationKind::Set => "set",
            OperationKind::Create => "create",
            OperationKind::Delete => "delete",
            OperationKind::Logout => "logout",
            OperationKind::Hit => "hit",
            OperationKind::Look => "look",
            OperationKind::Talk => "talk",
            OperationKind::Imaginary => "imaginary",
            OperationKind::Move => "move",
            OperationKind::Touch => "touch",
            OperationKind::Use => "use",
            OperationKind::Other(name) => name,
        }
    }

    pub fn from_type_name(name: &str) -> Self {
        match name {
            "sight" => OperationKind::Sight,
            "sound" => OperationKind::Sound,
            "appearance" => OperationKind::Appearance,
            "disappearance" => OperationKind::Disappearance,
            "unseen" => OperationKind::Unseen,
            "set" => OperationKind::Set,
            "create" => OperationKind::Create,
            "delete" => OperationKind::Delete,
            "logout" => OperationKind::Logout,
            "hit" => OperationKind::Hit,
            "look" => OperationKind::Look,
            "talk" => OperationKind::Talk,
            "imaginary" => OperationKind::Imaginary,
            "move" => OperationKind::Move,
            "touch" => OperationKind::Touch,
            "use" => OperationKind::Use,
            other => OperationKind::Other(other.to_string()),
        }
    }
}

/// An operation argument is either entity data or a nested operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationArg {
    Entity(EntityData),
    Operation(Box<Operation>),
}

impl OperationArg {
    pub fn as_entity(&self) -> Option<&EntityData> {
        match self {
            OperationArg::Entity(data) => Some(data),
            OperationArg::Operation(_) => None,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            OperationArg::Entity(_) => None,
            OperationArg::Operation(op) => Some(op),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub from: Option<String>,
    pub to: Option<String>,
    /// World time at which the server issued the operation
    pub seconds: Option<f64>,
    pub serialno: Option<i64>,
    pub refno: Option<i64>,
    pub args: Vec<OperationArg>,
}

impl Operation {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            from: None,
            to: None,
            seconds: None,
            serialno: None,
            refno: None,
            args: Vec::new(),
        }
    }

    /// Builds a LOOK request from `from`. Without a target id the look is
    /// anonymous and asks for the world root.
    pub fn look(from: &str, target: Option<&str>) -> Self {
        let mut look = Operation::new(OperationKind::Look).with_from(from);
        if let Some(target) = target {
            look = look.with_entity_arg(EntityData::new(target));
        }
        look
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_seconds(mut self, seconds: f64) -> Self {
        self.seconds = Some(seconds);
        self
    }

    pub fn with_serialno(mut self, serialno: i64) -> Self {
        self.serialno = Some(serialno);
        self
    }

    pub fn with_refno(mut self, refno: i64) -> Self {
        self.refno = Some(refno);
        self
    }

    pub fn with_entity_arg(mut self, data: EntityData) -> Self {
        self.args.push(OperationArg::Entity(data));
        self
    }

    pub fn with_operation_arg(mut self, op: Operation) -> Self {
        self.args.push(OperationArg::Operation(Box::new(op)));
        self
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    pub fn first_entity_arg(&self) -> Option<&EntityData> {
        self.args.first().and_then(OperationArg::as_entity)
    }

    /// Iterates the entity data arguments, skipping nested operations
    pub fn entity_args(&self) -> impl Iterator<Item = &EntityData> {
        self.args.iter().filter_map(OperationArg::as_entity)
    }

    /// Copy of this operation carrying a single argument
    pub fn with_single_arg(&self, arg: OperationArg) -> Self {
        Self {
            args: vec![arg],
            ..self.clone()
        }
    }
}
