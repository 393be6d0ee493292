//! Fixture `GraphDef`s built from tract's generated TensorFlow protobuf types.

use std::collections::HashMap;

use prost::Message;
use tract_tensorflow::tfpb::tensorflow::{attr_value, AttrValue, DataType, GraphDef, NodeDef};

fn dtype(dtype: DataType) -> AttrValue {
    AttrValue {
        value: Some(attr_value::Value::Type(dtype as i32)),
    }
}

/// A node with float type attributes.
pub fn node(name: &str, op: &str, inputs: &[&str], type_attrs: &[&str]) -> NodeDef {
    NodeDef {
        name: name.to_string(),
        op: op.to_string(),
        input: inputs.iter().map(|i| i.to_string()).collect(),
        attr: type_attrs
            .iter()
            .map(|attr| (attr.to_string(), dtype(DataType::DtFloat)))
            .collect::<HashMap<_, _>>(),
        ..Default::default()
    }
}

/// `output = Relu(input)` over a float placeholder of any shape, encoded.
pub fn relu_graph(input: &str, output: &str) -> Vec<u8> {
    GraphDef {
        node: vec![
            node(input, "Placeholder", &[], &["dtype"]),
            node(output, "Relu", &[input], &["T"]),
        ],
        ..Default::default()
    }
    .encode_to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_graph_decodes() {
        let bytes = relu_graph("x", "y");
        let graph = GraphDef::decode(bytes.as_slice()).unwrap();

        let names: Vec<&str> = graph.node.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(graph.node[1].op, "Relu");
        assert_eq!(graph.node[1].input, vec!["x"]);
        assert_eq!(graph.node[0].attr["dtype"], dtype(DataType::DtFloat));
    }
}
