//! Built-in draw.io styles for elements the style table does not cover.

use mxweave_core::spec::{NodeKind, RelationKind};

/// Style of one attribute or member row inside an entity or class container.
pub const ROW_STYLE: &str = "text;strokeColor=none;fillColor=none;align=left;verticalAlign=middle;\
spacingLeft=4;spacingRight=4;overflow=hidden;rotatable=0;points=[[0,0.5],[1,0.5]];\
portConstraint=eastwest;";

/// Style of the line between class attributes and methods.
pub const SEPARATOR_STYLE: &str = "line;strokeWidth=1;fillColor=none;align=left;\
verticalAlign=middle;spacingTop=-1;spacingLeft=3;spacingRight=3;rotatable=0;\
labelPosition=right;points=[];portConstraint=eastwest;";

pub fn node_style(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Entity => {
            "swimlane;fontStyle=1;childLayout=stackLayout;horizontal=1;horizontalStack=0;\
             resizeParent=1;resizeParentMax=0;resizeLast=0;collapsible=1;marginBottom=0;\
             fillColor=#dae8fc;strokeColor=#6c8ebf;"
        }
        NodeKind::Class => {
            "swimlane;fontStyle=1;align=center;verticalAlign=top;childLayout=stackLayout;\
             horizontal=1;horizontalStack=0;resizeParent=1;resizeParentMax=0;resizeLast=0;\
             collapsible=1;marginBottom=0;"
        }
        NodeKind::Lifeline => {
            "shape=umlLifeline;perimeter=lifelinePerimeter;whiteSpace=wrap;container=1;\
             dropTarget=0;collapsible=0;recursiveResize=0;outlineConnect=0;\
             portConstraint=eastwest;"
        }
        NodeKind::State => "rounded=1;whiteSpace=wrap;arcSize=40;fillColor=#fff2cc;strokeColor=#d6b656;",
        NodeKind::Initial => "ellipse;fillColor=#000000;strokeColor=none;",
        NodeKind::Final => "ellipse;shape=endState;fillColor=#000000;strokeColor=#000000;",
        NodeKind::Action => "rounded=1;whiteSpace=wrap;arcSize=40;",
        NodeKind::Decision | NodeKind::Merge | NodeKind::Rhombus => "rhombus;whiteSpace=wrap;",
        NodeKind::Actor => {
            "shape=umlActor;verticalLabelPosition=bottom;verticalAlign=top;outlineConnect=0;"
        }
        NodeKind::UseCase => "ellipse;whiteSpace=wrap;",
        NodeKind::Rect => "rounded=0;whiteSpace=wrap;",
        NodeKind::Round => "rounded=1;whiteSpace=wrap;",
    }
}

pub fn edge_style(relation: RelationKind) -> &'static str {
    match relation {
        RelationKind::Flow | RelationKind::Transition => "endArrow=classic;rounded=0;",
        RelationKind::Relationship => {
            "edgeStyle=entityRelationEdgeStyle;startArrow=ERmandOne;endArrow=ERmandOne;\
             startFill=0;endFill=0;rounded=0;"
        }
        RelationKind::Association => "endArrow=none;rounded=0;",
        RelationKind::Aggregation => {
            "startArrow=diamondThin;startFill=0;startSize=14;endArrow=none;rounded=0;"
        }
        RelationKind::Composition => {
            "startArrow=diamondThin;startFill=1;startSize=14;endArrow=none;rounded=0;"
        }
        RelationKind::Inheritance => "endArrow=block;endFill=0;endSize=12;rounded=0;",
        RelationKind::Realization => "endArrow=block;endFill=0;endSize=12;dashed=1;rounded=0;",
        RelationKind::Dependency => "endArrow=open;endFill=0;dashed=1;rounded=0;",
        RelationKind::Message => "endArrow=block;endFill=1;rounded=0;",
        RelationKind::AsyncMessage => "endArrow=open;endFill=0;rounded=0;",
        RelationKind::Reply | RelationKind::Include | RelationKind::Extend => {
            "endArrow=open;endFill=0;dashed=1;rounded=0;"
        }
    }
}

/// draw.io ER markers for a relationship cardinality, as `(start, end)`.
///
/// Two-sided forms (`1:N`, `0..1:1..*`, `one-to-many`) map each side; a
/// single multiplicity such as `1..1` or `0..*` describes the target side of
/// a relationship whose source side is exactly one.
///
/// ```
/// # use mxweave::export::cardinality_markers;
/// assert_eq!(cardinality_markers("1:N"), Some(("ERmandOne", "ERmany")));
/// assert_eq!(cardinality_markers("1..1"), Some(("ERmandOne", "ERmandOne")));
/// assert_eq!(cardinality_markers("sometimes"), None);
/// ```
pub fn cardinality_markers(cardinality: &str) -> Option<(&'static str, &'static str)> {
    let lowered = cardinality.trim().to_ascii_lowercase();
    let sides = lowered
        .split_once(':')
        .or_else(|| lowered.split_once("-to-"))
        .or_else(|| lowered.split_once("_to_"))
        .or_else(|| lowered.split_once(" to "));

    match sides {
        Some((source, target)) => Some((side_marker(source)?, side_marker(target)?)),
        None => Some(("ERmandOne", side_marker(&lowered)?)),
    }
}

fn side_marker(side: &str) -> Option<&'static str> {
    match side.trim() {
        "1" | "1..1" | "one" | "exactly-one" => Some("ERmandOne"),
        "0..1" | "?" | "zero-or-one" | "optional" => Some("ERzeroToOne"),
        "n" | "m" | "*" | "many" => Some("ERmany"),
        "0..*" | "0..n" | "zero-or-many" => Some("ERzeroToMany"),
        "1..*" | "1..n" | "+" | "one-or-many" => Some("ERoneToMany"),
        _ => None,
    }
}
