/// Instanced Lambert shader for every scene node
pub const SCENE_SHADER: &str = r#"
struct SceneUniform {
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,
    light_dirs: array<vec4<f32>, 2>,
    light_colors: array<vec4<f32>, 2>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) normal_0: vec4<f32>,
    @location(7) normal_1: vec4<f32>,
    @location(8) normal_2: vec4<f32>,
    @location(9) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
    let normal_matrix = mat3x3<f32>(instance.normal_0.xyz, instance.normal_1.xyz, instance.normal_2.xyz);

    var out: VertexOutput;
    out.clip_position = scene.view_proj * model * vec4<f32>(vertex.position, 1.0);
    out.normal = normal_matrix * vertex.normal;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    var light = scene.ambient.rgb;
    for (var i = 0u; i < 2u; i = i + 1u) {
        light = light + scene.light_colors[i].rgb * max(dot(n, scene.light_dirs[i].xyz), 0.0);
    }
    return vec4<f32>(in.color.rgb * min(light, vec3<f32>(1.0)), in.color.a);
}
"#;
